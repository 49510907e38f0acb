//! Error types for the accounts crate.

use thiserror::Error;

/// Errors from the credential and review stores
#[derive(Error, Debug)]
pub enum AccountError {
    /// A registration field was left empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Login was attempted before anyone registered
    #[error("No users registered yet")]
    NoUsersFile,

    /// No row matched both username and password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Star rating outside 1-5
    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    /// Unknown gender label
    #[error("Invalid gender: {0}")]
    InvalidGender(String),

    /// Password hashing failed
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, AccountError>;
