//! Review Store - user reviews in `reviews.csv`
//!
//! Columns: User, Book, Rating, Review. Append-only; the book title is
//! stored as given and never checked against the catalog.

use crate::error::{AccountError, Result};
use crate::tabular;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

/// A 1-5 star rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct StarRating(u8);

impl StarRating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn value(self) -> u8 {
        self.0
    }
}

/// The input widget's starting position
impl Default for StarRating {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<u8> for StarRating {
    type Error = AccountError;

    fn try_from(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(AccountError::InvalidRating(value))
        }
    }
}

impl From<StarRating> for u8 {
    fn from(rating: StarRating) -> u8 {
        rating.0
    }
}

impl fmt::Display for StarRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of the review file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "User")]
    pub user: String,
    #[serde(rename = "Book")]
    pub book: String,
    #[serde(rename = "Rating")]
    pub rating: StarRating,
    #[serde(rename = "Review")]
    pub review: String,
}

/// Flat-file review log
pub struct ReviewStore {
    path: PathBuf,
}

impl ReviewStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one review
    ///
    /// No validation beyond what [`StarRating`] already enforces; only an
    /// I/O failure makes this return an error.
    pub fn submit(&self, username: &str, book: &str, rating: StarRating, text: &str) -> Result<()> {
        let review = Review {
            user: username.to_string(),
            book: book.to_string(),
            rating,
            review: text.to_string(),
        };
        tabular::append_row(&self.path, &review)?;

        info!("Stored {}-star review of {:?} by {}", rating, book, username);
        Ok(())
    }

    /// Every review in file order (empty if none were submitted)
    pub fn reviews(&self) -> Result<Vec<Review>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        tabular::read_rows(&self.path)
    }
}
