//! # Similarity Crate
//!
//! Item-item similarity for the book recommender.
//!
//! ## Components
//!
//! ### Rating Matrix
//! Ratings reduced to the most-rated books and most active users, pivoted
//! into a book × user matrix and stored as CSR.
//!
//! ### Cosine Neighbors
//! Brute-force cosine-distance nearest neighbors over the matrix rows.
//! "Readers who rated this book rated these books the same way."
//!
//! ## Example Usage
//!
//! ```ignore
//! use similarity::{CosineNeighbors, RatingMatrixBuilder, DEFAULT_NEIGHBORS};
//!
//! let matrix = RatingMatrixBuilder::new().build(catalog.ratings());
//! let model = CosineNeighbors::fit(matrix);
//!
//! let row = model.matrix().row_of("0446520802").unwrap();
//! let neighbors = model.kneighbors(row, DEFAULT_NEIGHBORS);
//! ```

pub mod matrix;
pub mod model;

pub use matrix::{RatingMatrix, RatingMatrixBuilder, RowView, DEFAULT_TOP_N};
pub use model::{CosineNeighbors, Neighbor, DEFAULT_NEIGHBORS};
