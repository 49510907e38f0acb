//! Error types for the data-loader crate.
//!
//! Malformed rows in the Book-Crossing files are skipped rather than
//! reported, so these errors only cover conditions that stop a load
//! entirely: a missing file, an unreadable file, or a broken header.

use thiserror::Error;

/// Errors that can occur while loading the book catalog
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The delimited reader failed on something other than a single bad row
    #[error("CSV error in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    /// A required column is missing from the header row
    #[error("Missing column {column} in {file}")]
    MissingColumn { file: String, column: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
