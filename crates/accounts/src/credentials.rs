//! Credential Store - registered users in `users.csv`
//!
//! Columns: Name, College, Domain, RollNo, Contact, Gender, Username, Password
//!
//! Registration appends a row; login scans every row. Usernames are not
//! unique: registering the same name twice adds a second row, and a login
//! succeeds if any row with that name accepts the password.

use crate::error::{AccountError, Result};
use crate::tabular;
use crate::traits::CredentialVerifier;
use crate::verifiers::PlaintextVerifier;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Gender choices offered on the registration form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        };
        f.write_str(label)
    }
}

impl FromStr for Gender {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" | "o" => Ok(Gender::Other),
            _ => Err(AccountError::InvalidGender(s.to_string())),
        }
    }
}

/// Registration form as filled in by the user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub college: String,
    pub domain: String,
    pub roll_no: String,
    pub contact: String,
    pub gender: Gender,
    pub username: String,
    pub password: String,
}

impl NewUser {
    /// First empty field, by column name
    fn missing_field(&self) -> Option<&'static str> {
        [
            ("Name", &self.name),
            ("College", &self.college),
            ("Domain", &self.domain),
            ("RollNo", &self.roll_no),
            ("Contact", &self.contact),
            ("Username", &self.username),
            ("Password", &self.password),
        ]
        .into_iter()
        .find(|(_, value)| value.is_empty())
        .map(|(column, _)| column)
    }
}

/// One row of the credential file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "College")]
    pub college: String,
    #[serde(rename = "Domain")]
    pub domain: String,
    #[serde(rename = "RollNo")]
    pub roll_no: String,
    #[serde(rename = "Contact")]
    pub contact: String,
    #[serde(rename = "Gender")]
    pub gender: Gender,
    #[serde(rename = "Username")]
    pub username: String,
    /// Whatever the verifier produced at registration time
    #[serde(rename = "Password")]
    pub password: String,
}

/// Flat-file user registry
pub struct CredentialStore {
    path: PathBuf,
    verifier: Box<dyn CredentialVerifier>,
}

impl CredentialStore {
    /// Store backed by `path`, comparing passwords in plaintext
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            verifier: Box::new(PlaintextVerifier),
        }
    }

    /// Replace the password scheme (builder pattern)
    pub fn with_verifier(mut self, verifier: impl CredentialVerifier + 'static) -> Self {
        self.verifier = Box::new(verifier);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a user row
    ///
    /// Fails without touching the file if any field is empty.
    pub fn register(&self, user: NewUser) -> Result<()> {
        if let Some(column) = user.missing_field() {
            debug!("Registration rejected, {} is empty", column);
            return Err(AccountError::MissingField(column));
        }

        let record = UserRecord {
            password: self.verifier.seal(&user.password)?,
            name: user.name,
            college: user.college,
            domain: user.domain,
            roll_no: user.roll_no,
            contact: user.contact,
            gender: user.gender,
            username: user.username,
        };
        tabular::append_row(&self.path, &record)?;

        info!(
            "Registered user {} ({})",
            record.username,
            self.verifier.name()
        );
        Ok(())
    }

    /// Find the first row matching both username and password
    pub fn login(&self, username: &str, password: &str) -> Result<UserRecord> {
        if !self.path.exists() {
            return Err(AccountError::NoUsersFile);
        }

        let found = self
            .users()?
            .into_iter()
            .find(|row| row.username == username && self.verifier.verify(password, &row.password));

        match found {
            Some(record) => {
                info!("User {} logged in", username);
                Ok(record)
            }
            None => {
                debug!("Login rejected for {}", username);
                Err(AccountError::InvalidCredentials)
            }
        }
    }

    /// Every registered row in file order (empty if nobody registered)
    pub fn users(&self) -> Result<Vec<UserRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        tabular::read_rows(&self.path)
    }
}
