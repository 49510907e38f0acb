//! Catalog loading and dataset fingerprinting.

use crate::error::Result;
use crate::parser;
use crate::types::*;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::info;

/// File name of the book metadata table
pub const BOOKS_FILE: &str = "BX-Books.csv";
/// File name of the ratings table
pub const RATINGS_FILE: &str = "BX-Book-Ratings.csv";

impl Catalog {
    /// Load the Book-Crossing dataset from a directory
    ///
    /// Both files are parsed in parallel with `rayon::join`. Malformed rows
    /// are skipped; only a missing or unreadable file is an error.
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        let books_path = data_dir.join(BOOKS_FILE);
        let ratings_path = data_dir.join(RATINGS_FILE);

        let (books, ratings) = rayon::join(
            || parser::parse_books(&books_path),
            || parser::parse_ratings(&ratings_path),
        );
        let books = books?;
        let ratings = ratings?;

        info!(
            "Loaded {} books ({} skipped), {} ratings ({} skipped) from {:?}",
            books.rows.len(),
            books.skipped,
            ratings.rows.len(),
            ratings.skipped,
            data_dir
        );

        let mut catalog = Catalog::from_parts(books.rows, ratings.rows);
        catalog.skipped_rows = books.skipped + ratings.skipped;
        Ok(catalog)
    }
}

/// Size and modification time of the two dataset files.
///
/// Two fingerprints compare equal when neither file has been replaced or
/// touched in between, which is what decides whether a cached similarity
/// index can still be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetFingerprint {
    files: Vec<(PathBuf, u64, Option<SystemTime>)>,
}

impl DatasetFingerprint {
    /// Stat both dataset files under `data_dir`
    pub fn capture(data_dir: &Path) -> Result<Self> {
        let mut files = Vec::with_capacity(2);
        for name in [BOOKS_FILE, RATINGS_FILE] {
            let path = data_dir.join(name);
            let meta = std::fs::metadata(&path)?;
            files.push((path, meta.len(), meta.modified().ok()));
        }
        Ok(Self { files })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_dataset(dir: &Path) {
        std::fs::write(
            dir.join(BOOKS_FILE),
            "\"ISBN\";\"Book-Title\";\"Book-Author\"\n\
             \"111\";\"First Book\";\"A\"\n\
             \"222\";\"Second Book\";\"B\"\n\
             \"333\";\"Broken \"quote\" Book\";\"C\";\"extra\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.join(RATINGS_FILE),
            "\"User-ID\";\"ISBN\";\"Book-Rating\"\n\
             \"1\";\"111\";\"5\"\n\
             \"2\";\"111\";\"7\"\n\
             \"2\";\"222\";\"0\"\n",
        )
        .unwrap();
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path());

        let catalog = Catalog::load_from_files(dir.path()).unwrap();
        let (books, ratings, titles) = catalog.counts();

        assert_eq!(books, 2);
        assert_eq!(ratings, 3);
        assert_eq!(titles, 2);
        assert_eq!(catalog.skipped_rows(), 1);
        assert_eq!(catalog.isbn_of("Second Book"), Some("222"));
    }

    #[test]
    fn test_missing_dataset_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Catalog::load_from_files(dir.path()).is_err());
    }

    #[test]
    fn test_fingerprint_changes_when_file_changes() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path());

        let before = DatasetFingerprint::capture(dir.path()).unwrap();
        assert_eq!(before, DatasetFingerprint::capture(dir.path()).unwrap());

        std::fs::write(
            dir.path().join(RATINGS_FILE),
            "\"User-ID\";\"ISBN\";\"Book-Rating\"\n\"1\";\"111\";\"5\"\n",
        )
        .unwrap();
        let after = DatasetFingerprint::capture(dir.path()).unwrap();
        assert_ne!(before, after);
    }
}
