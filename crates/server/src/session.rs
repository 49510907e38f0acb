//! Per-session state and view routing.
//!
//! A [`Session`] is owned by whoever drives the interaction (the terminal
//! loop in the CLI) and passed explicitly to every controller call.

use accounts::{CredentialStore, Result};
use tracing::info;

/// Which screen the session should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Recommender,
}

#[derive(Debug, Clone)]
pub struct Session {
    logged_in: bool,
    username: String,
    view: View,
    selected_book: Option<String>,
}

impl Session {
    /// Fresh session on the login screen
    pub fn new() -> Self {
        Self {
            logged_in: false,
            username: String::new(),
            view: View::Login,
            selected_book: None,
        }
    }

    /// Route: the recommender is only reachable while logged in
    pub fn current_view(&self) -> View {
        if self.view == View::Login || !self.logged_in {
            View::Login
        } else {
            View::Recommender
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// Logged-in username
    pub fn username(&self) -> Option<&str> {
        self.logged_in.then_some(self.username.as_str())
    }

    /// Check credentials and move to the recommender on success
    ///
    /// A rejected attempt leaves the session untouched.
    pub fn login(&mut self, store: &CredentialStore, username: &str, password: &str) -> Result<()> {
        store.login(username, password)?;
        self.logged_in = true;
        self.username = username.to_string();
        self.view = View::Recommender;
        Ok(())
    }

    /// Clear everything and go back to the login screen
    pub fn logout(&mut self) {
        info!("User {} logged out", self.username);
        *self = Self::new();
    }

    pub fn select_book(&mut self, title: impl Into<String>) {
        self.selected_book = Some(title.into());
    }

    pub fn selected_book(&self) -> Option<&str> {
        self.selected_book.as_deref()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accounts::{AccountError, Gender, NewUser};

    fn store_with_user(dir: &std::path::Path) -> CredentialStore {
        let store = CredentialStore::new(dir.join("users.csv"));
        store
            .register(NewUser {
                name: "Mei".to_string(),
                college: "East".to_string(),
                domain: "History".to_string(),
                roll_no: "H-1".to_string(),
                contact: "5550111".to_string(),
                gender: Gender::Other,
                username: "mei".to_string(),
                password: "pw".to_string(),
            })
            .unwrap();
        store
    }

    #[test]
    fn test_initial_state() {
        let session = Session::new();
        assert_eq!(session.current_view(), View::Login);
        assert!(!session.is_logged_in());
        assert_eq!(session.username(), None);
    }

    #[test]
    fn test_login_and_logout() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_user(dir.path());
        let mut session = Session::new();

        session.login(&store, "mei", "pw").unwrap();
        assert_eq!(session.current_view(), View::Recommender);
        assert_eq!(session.username(), Some("mei"));

        session.select_book("Emma");
        session.logout();
        assert_eq!(session.current_view(), View::Login);
        assert_eq!(session.username(), None);
        assert_eq!(session.selected_book(), None);
    }

    #[test]
    fn test_rejected_login_stays_on_login() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_user(dir.path());
        let mut session = Session::new();

        let result = session.login(&store, "mei", "nope");
        assert!(matches!(result, Err(AccountError::InvalidCredentials)));
        assert_eq!(session.current_view(), View::Login);
    }

    #[test]
    fn test_view_requires_login_flag() {
        let mut session = Session::new();
        session.view = View::Recommender;
        assert_eq!(session.current_view(), View::Login);
    }
}
