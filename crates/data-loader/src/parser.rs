//! Parser for the Book-Crossing data files.
//!
//! - BX-Books.csv: "ISBN";"Book-Title";"Book-Author";"Year-Of-Publication";...
//! - BX-Book-Ratings.csv: "User-ID";"ISBN";"Book-Rating"
//!
//! Both files are semicolon-delimited, double-quote quoted and Latin-1
//! encoded. They also contain a fair number of broken rows (stray quotes,
//! embedded semicolons), so parsing is lenient: a row that doesn't
//! deserialize is dropped and counted instead of failing the load.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

pub const BOOKS_COLUMNS: &[&str] = &["ISBN", "Book-Title"];
pub const RATINGS_COLUMNS: &[&str] = &["User-ID", "ISBN", "Book-Rating"];

/// Read a whole file and decode it as ISO-8859-1 (Latin-1)
///
/// Latin-1 maps every byte straight to the code point of the same value,
/// so decoding never fails.
pub fn read_latin1(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    Ok(bytes.iter().map(|&b| b as char).collect())
}

/// Parse `BX-Books.csv`
pub fn parse_books(path: &Path) -> Result<ParsedRows<Book>> {
    let content = read_latin1(path)?;
    parse_rows(content.as_bytes(), &file_label(path), BOOKS_COLUMNS)
}

/// Parse `BX-Book-Ratings.csv`
pub fn parse_ratings(path: &Path) -> Result<ParsedRows<BookRating>> {
    let content = read_latin1(path)?;
    parse_rows(content.as_bytes(), &file_label(path), RATINGS_COLUMNS)
}

/// Parse semicolon-delimited rows from any reader
///
/// `required` lists the header columns that must be present; a file missing
/// one of them is rejected outright since every row would be dropped anyway.
pub fn parse_rows<T, R>(reader: R, file: &str, required: &[&str]) -> Result<ParsedRows<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|source| DataLoadError::Csv {
            file: file.to_string(),
            source,
        })?
        .clone();
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(DataLoadError::MissingColumn {
                file: file.to_string(),
                column: column.to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    let mut skipped = 0;
    for (idx, result) in csv_reader.deserialize::<T>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(err) if err.is_io_error() => {
                return Err(DataLoadError::Csv {
                    file: file.to_string(),
                    source: err,
                });
            }
            Err(err) => {
                // header is line 1
                debug!("Skipping {} record {}: {}", file, idx + 2, err);
                skipped += 1;
            }
        }
    }

    Ok(ParsedRows { rows, skipped })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
