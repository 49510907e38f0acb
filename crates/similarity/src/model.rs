//! Brute-force cosine nearest neighbors over rating matrix rows
//!
//! Distance is `1 - cos(a, b)`. A row with no non-zero cells has a zero
//! norm; its similarity to anything is taken as 0, so its distance is 1.
//! Results are ordered by ascending distance, ties by ascending row, and
//! the query row is not excluded: querying a stored row returns that row
//! first at distance 0.

use crate::matrix::{RatingMatrix, RowView};
use rayon::prelude::*;
use tracing::{debug, instrument};

/// Number of neighbors the recommender asks for
pub const DEFAULT_NEIGHBORS: usize = 6;

/// One nearest-neighbor hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub row: usize,
    pub distance: f64,
}

/// Cosine nearest-neighbor model fitted on a [`RatingMatrix`]
#[derive(Debug, Clone)]
pub struct CosineNeighbors {
    matrix: RatingMatrix,
    /// Precomputed row norms
    norms: Vec<f64>,
}

impl CosineNeighbors {
    /// Fit the model: takes ownership of the matrix and caches row norms
    pub fn fit(matrix: RatingMatrix) -> Self {
        let norms = (0..matrix.n_rows())
            .into_par_iter()
            .map(|row| matrix.row(row).map(|r| r.norm()).unwrap_or(0.0))
            .collect();
        Self { matrix, norms }
    }

    /// The matrix the model was fitted on
    pub fn matrix(&self) -> &RatingMatrix {
        &self.matrix
    }

    /// `k` nearest neighbors of a stored row
    ///
    /// Returns `None` if the row is out of range. Asking for more neighbors
    /// than there are rows returns every row.
    pub fn kneighbors(&self, row: usize, k: usize) -> Option<Vec<Neighbor>> {
        let query = self.matrix.row(row)?;
        Some(self.kneighbors_of(query, k))
    }

    /// `k` nearest neighbors of an arbitrary sparse vector
    #[instrument(skip(self, query), fields(nnz = query.nnz()))]
    pub fn kneighbors_of(&self, query: RowView<'_>, k: usize) -> Vec<Neighbor> {
        let query_norm = query.norm();

        let mut neighbors: Vec<Neighbor> = (0..self.matrix.n_rows())
            .into_par_iter()
            .filter_map(|row| {
                let candidate = self.matrix.row(row)?;
                Some(Neighbor {
                    row,
                    distance: cosine_distance(&query, query_norm, &candidate, self.norms[row]),
                })
            })
            .collect();

        neighbors.sort_unstable_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.row.cmp(&b.row))
        });
        neighbors.truncate(k);

        debug!("Found {} neighbors", neighbors.len());
        neighbors
    }
}

/// Cosine distance given precomputed norms, clamped to [0, 2]
fn cosine_distance(a: &RowView<'_>, a_norm: f64, b: &RowView<'_>, b_norm: f64) -> f64 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 1.0;
    }
    let similarity = a.dot(b) / (a_norm * b_norm);
    (1.0 - similarity).clamp(0.0, 2.0)
}
