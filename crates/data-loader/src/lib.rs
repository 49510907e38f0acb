//! # Data Loader Crate
//!
//! Loads the Book-Crossing dataset (`BX-Books.csv`, `BX-Book-Ratings.csv`)
//! into a [`Catalog`].
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Book, BookRating, Catalog)
//! - **parser**: Lenient Latin-1, semicolon-delimited parsing
//! - **index**: Loading entry point and dataset fingerprints
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::Catalog;
//! use std::path::Path;
//!
//! let catalog = Catalog::load_from_files(Path::new("data"))?;
//! let isbn = catalog.isbn_of("Clara Callan");
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use index::{DatasetFingerprint, BOOKS_FILE, RATINGS_FILE};
pub use types::{Book, BookRating, Catalog, Isbn, ParsedRows, UserId};
