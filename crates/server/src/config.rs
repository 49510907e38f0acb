//! Application configuration.
//!
//! The CLI fills this in from flags and environment variables; tests use
//! `Default` and override what they need.

use accounts::{BcryptVerifier, CredentialStore, ReviewStore};
use anyhow::{Context, Result};
use poster_client::{GoogleBooksClient, PosterFetcher, DEFAULT_BASE_URL, DEFAULT_CACHE_CAPACITY};
use similarity::{RatingMatrixBuilder, DEFAULT_NEIGHBORS, DEFAULT_TOP_N};
use std::path::PathBuf;
use std::time::Duration;

/// How passwords are written to and checked against the users file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialScheme {
    Plaintext,
    Bcrypt { cost: u32 },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding BX-Books.csv and BX-Book-Ratings.csv
    pub data_dir: PathBuf,
    pub users_file: PathBuf,
    pub reviews_file: PathBuf,
    pub top_books: usize,
    pub top_users: usize,
    /// Neighbors per query, the queried book included
    pub neighbors: usize,
    pub poster_cache_capacity: usize,
    pub poster_api_base: String,
    pub poster_timeout: Option<Duration>,
    pub credential_scheme: CredentialScheme,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            users_file: PathBuf::from("users.csv"),
            reviews_file: PathBuf::from("reviews.csv"),
            top_books: DEFAULT_TOP_N,
            top_users: DEFAULT_TOP_N,
            neighbors: DEFAULT_NEIGHBORS,
            poster_cache_capacity: DEFAULT_CACHE_CAPACITY,
            poster_api_base: DEFAULT_BASE_URL.to_string(),
            poster_timeout: None,
            credential_scheme: CredentialScheme::Plaintext,
        }
    }
}

impl AppConfig {
    pub fn credential_store(&self) -> CredentialStore {
        let store = CredentialStore::new(&self.users_file);
        match self.credential_scheme {
            CredentialScheme::Plaintext => store,
            CredentialScheme::Bcrypt { cost } => store.with_verifier(BcryptVerifier::new(cost)),
        }
    }

    pub fn review_store(&self) -> ReviewStore {
        ReviewStore::new(&self.reviews_file)
    }

    pub fn matrix_builder(&self) -> RatingMatrixBuilder {
        RatingMatrixBuilder::new()
            .with_top_books(self.top_books)
            .with_top_users(self.top_users)
    }

    pub fn poster_fetcher(&self) -> Result<PosterFetcher> {
        let client = GoogleBooksClient::new(&self.poster_api_base, self.poster_timeout)
            .context("Failed to build poster HTTP client")?;
        Ok(PosterFetcher::new(client, self.poster_cache_capacity))
    }
}
