//! Core domain types for the Book-Crossing dataset.
//!
//! The catalog is two tables: book metadata keyed by ISBN and a long list
//! of (user, ISBN, rating) triples. Everything downstream (the rating
//! matrix, the selector list, the title lookups) is derived from these.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// ISBN as it appears in the dataset. Not normalized: "034545104X" and
/// "034545104x" are different keys, exactly as in the source files.
pub type Isbn = String;

/// Book-Crossing user identifier
pub type UserId = u32;

// =============================================================================
// Books
// =============================================================================

/// One row of `BX-Books.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "ISBN")]
    pub isbn: Isbn,
    #[serde(rename = "Book-Title")]
    pub title: String,
    #[serde(rename = "Book-Author", default)]
    pub author: Option<String>,
    /// Publication year; the raw column contains publisher names and zeros
    /// in places, so anything that isn't a number becomes `None`.
    #[serde(
        rename = "Year-Of-Publication",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub year: Option<u16>,
    #[serde(rename = "Publisher", default)]
    pub publisher: Option<String>,
    #[serde(rename = "Image-URL-S", default)]
    pub image_url_small: Option<String>,
    #[serde(rename = "Image-URL-M", default)]
    pub image_url_medium: Option<String>,
    #[serde(rename = "Image-URL-L", default)]
    pub image_url_large: Option<String>,
}

impl Book {
    /// Minimal constructor used by tests and synthetic catalogs
    pub fn new(isbn: impl Into<Isbn>, title: impl Into<String>) -> Self {
        Self {
            isbn: isbn.into(),
            title: title.into(),
            author: None,
            year: None,
            publisher: None,
            image_url_small: None,
            image_url_medium: None,
            image_url_large: None,
        }
    }
}

// =============================================================================
// Ratings
// =============================================================================

/// One row of `BX-Book-Ratings.csv`
///
/// Ratings are on the 0-10 Book-Crossing scale where 0 marks an implicit
/// interaction. They are kept as-is; the matrix treats 0 like a missing cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRating {
    #[serde(rename = "User-ID")]
    pub user_id: UserId,
    #[serde(rename = "ISBN")]
    pub isbn: Isbn,
    #[serde(rename = "Book-Rating")]
    pub rating: u8,
}

impl BookRating {
    pub fn new(user_id: UserId, isbn: impl Into<Isbn>, rating: u8) -> Self {
        Self {
            user_id,
            isbn: isbn.into(),
            rating,
        }
    }
}

// =============================================================================
// Catalog - the loaded dataset
// =============================================================================

/// Rows successfully parsed from one file plus the number of rows dropped
#[derive(Debug, Clone)]
pub struct ParsedRows<T> {
    pub rows: Vec<T>,
    pub skipped: usize,
}

/// Books, ratings and the title lookups derived from them.
///
/// Title maps follow dictionary semantics: ISBN → title is last-write-wins
/// over repeated ISBN rows, and title → ISBN is built by inverting that map
/// in file order, so when two ISBNs share a title the later one wins.
#[derive(Debug, Default)]
pub struct Catalog {
    pub(crate) books: Vec<Book>,
    pub(crate) ratings: Vec<BookRating>,
    pub(crate) isbn_to_title: HashMap<Isbn, String>,
    pub(crate) title_to_isbn: HashMap<String, Isbn>,
    pub(crate) skipped_rows: usize,
}

impl Catalog {
    /// Creates an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from already-parsed rows and derive the title maps
    pub fn from_parts(books: Vec<Book>, ratings: Vec<BookRating>) -> Self {
        let mut isbn_to_title: HashMap<Isbn, String> = HashMap::new();
        let mut isbn_order: Vec<&Isbn> = Vec::new();
        for book in &books {
            if book.title.is_empty() {
                continue;
            }
            if isbn_to_title
                .insert(book.isbn.clone(), book.title.clone())
                .is_none()
            {
                isbn_order.push(&book.isbn);
            }
        }

        let mut title_to_isbn: HashMap<String, Isbn> = HashMap::new();
        for isbn in isbn_order {
            if let Some(title) = isbn_to_title.get(isbn) {
                title_to_isbn.insert(title.clone(), isbn.clone());
            }
        }

        Self {
            books,
            ratings,
            isbn_to_title,
            title_to_isbn,
            skipped_rows: 0,
        }
    }

    /// All book rows in file order
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// All rating rows in file order
    pub fn ratings(&self) -> &[BookRating] {
        &self.ratings
    }

    /// Title recorded for an ISBN
    pub fn title_of(&self, isbn: &str) -> Option<&str> {
        self.isbn_to_title.get(isbn).map(String::as_str)
    }

    /// ISBN a title resolves to
    pub fn isbn_of(&self, title: &str) -> Option<&str> {
        self.title_to_isbn.get(title).map(String::as_str)
    }

    /// Number of malformed rows dropped while loading
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// (books, ratings, distinct titles)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.books.len(), self.ratings.len(), self.title_to_isbn.len())
    }
}
