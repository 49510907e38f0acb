//! View controller: the operations behind each screen, bound to the
//! stores and the recommender for the lifetime of the process.

use accounts::{CredentialStore, NewUser, ReviewStore, StarRating};
use anyhow::{bail, Result};

use crate::config::AppConfig;
use crate::orchestrator::BookRecommender;
use crate::session::{Session, View};

pub struct AppContext {
    credentials: CredentialStore,
    reviews: ReviewStore,
    recommender: BookRecommender,
}

impl AppContext {
    pub fn new(credentials: CredentialStore, reviews: ReviewStore, recommender: BookRecommender) -> Self {
        Self {
            credentials,
            reviews,
            recommender,
        }
    }

    /// Wire everything up from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            config.credential_store(),
            config.review_store(),
            BookRecommender::from_config(config)?,
        ))
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn reviews(&self) -> &ReviewStore {
        &self.reviews
    }

    pub fn recommender(&self) -> &BookRecommender {
        &self.recommender
    }

    pub fn register(&self, user: NewUser) -> accounts::Result<()> {
        self.credentials.register(user)
    }

    pub fn login(&self, session: &mut Session, username: &str, password: &str) -> accounts::Result<()> {
        session.login(&self.credentials, username, password)
    }

    pub fn logout(&self, session: &mut Session) {
        session.logout();
    }

    /// Store a review of the session's selected book (empty title if none)
    pub fn submit_review(&self, session: &Session, rating: StarRating, text: &str) -> Result<()> {
        let Some(username) = session.username() else {
            bail!("Reviews require a logged-in session");
        };
        if session.current_view() != View::Recommender {
            bail!("Reviews are submitted from the recommender view");
        }
        let book = session.selected_book().unwrap_or_default();
        self.reviews.submit(username, book, rating, text)?;
        Ok(())
    }
}
