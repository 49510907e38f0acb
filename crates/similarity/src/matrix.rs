//! Rating Matrix - book × user ratings in compressed sparse row form
//!
//! ## Algorithm
//! 1. Count ratings per ISBN and per user
//! 2. Keep the `top_books` most-rated ISBNs and the `top_users` most active users
//! 3. Drop every rating whose ISBN or user didn't make the cut
//! 4. Pivot what's left: one row per ISBN, one column per user, missing = 0
//! 5. Store only the non-zero cells (CSR)
//!
//! Rows are ordered by ISBN and columns by user id, both ascending, so the
//! same ratings always produce the same matrix.

use data_loader::{BookRating, Isbn, UserId};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;
use tracing::{debug, instrument};

/// Default cut-off for both the book and the user frequency filters
pub const DEFAULT_TOP_N: usize = 5000;

/// Borrowed view of one matrix row
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    /// Column positions, strictly increasing
    pub indices: &'a [usize],
    pub values: &'a [f32],
}

impl RowView<'_> {
    /// Euclidean norm of the row
    pub fn norm(&self) -> f64 {
        self.values
            .iter()
            .map(|&v| (v as f64) * (v as f64))
            .sum::<f64>()
            .sqrt()
    }

    /// Dot product with another row (merge over the sorted column lists)
    pub fn dot(&self, other: &RowView<'_>) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] as f64 * other.values[j] as f64;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Number of stored (non-zero) cells
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }
}

/// Book × user rating matrix
#[derive(Debug, Clone, Default)]
pub struct RatingMatrix {
    isbns: Vec<Isbn>,
    users: Vec<UserId>,
    row_lookup: HashMap<Isbn, usize>,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    values: Vec<f32>,
}

impl RatingMatrix {
    /// Row position of an ISBN
    pub fn row_of(&self, isbn: &str) -> Option<usize> {
        self.row_lookup.get(isbn).copied()
    }

    /// ISBN labelling a row
    pub fn isbn_at(&self, row: usize) -> Option<&str> {
        self.isbns.get(row).map(String::as_str)
    }

    /// Sparse view of a row
    pub fn row(&self, row: usize) -> Option<RowView<'_>> {
        if row >= self.n_rows() {
            return None;
        }
        let (start, end) = (self.indptr[row], self.indptr[row + 1]);
        Some(RowView {
            indices: &self.indices[start..end],
            values: &self.values[start..end],
        })
    }

    /// Row labels in row order
    pub fn isbns(&self) -> &[Isbn] {
        &self.isbns
    }

    /// Column labels in column order
    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    pub fn contains(&self, isbn: &str) -> bool {
        self.row_lookup.contains_key(isbn)
    }

    pub fn n_rows(&self) -> usize {
        self.isbns.len()
    }

    pub fn n_cols(&self) -> usize {
        self.users.len()
    }

    /// Number of stored non-zero cells
    pub fn nnz(&self) -> usize {
        self.values.len()
    }
}

/// Builds a [`RatingMatrix`] from raw ratings
#[derive(Debug, Clone)]
pub struct RatingMatrixBuilder {
    top_books: usize,
    top_users: usize,
}

impl RatingMatrixBuilder {
    /// Create a builder with the default cut-offs (5000 books, 5000 users)
    pub fn new() -> Self {
        Self {
            top_books: DEFAULT_TOP_N,
            top_users: DEFAULT_TOP_N,
        }
    }

    /// Configure how many of the most-rated books survive (default: 5000)
    pub fn with_top_books(mut self, n: usize) -> Self {
        self.top_books = n;
        self
    }

    /// Configure how many of the most active users survive (default: 5000)
    pub fn with_top_users(mut self, n: usize) -> Self {
        self.top_users = n;
        self
    }

    /// Filter, pivot and compress the ratings
    #[instrument(skip_all, fields(ratings = ratings.len()))]
    pub fn build(&self, ratings: &[BookRating]) -> RatingMatrix {
        let book_counts = count_by(ratings, |r| r.isbn.as_str());
        let user_counts = count_by(ratings, |r| r.user_id);

        let top_books = most_frequent(book_counts, self.top_books);
        let top_users = most_frequent(user_counts, self.top_users);
        debug!(
            "Kept {} books and {} users after frequency filter",
            top_books.len(),
            top_users.len()
        );

        // Pivot: ISBN -> (user -> rating). Sorted maps give sorted rows and
        // columns; a repeated (ISBN, user) pair keeps its last rating.
        let mut pivot: BTreeMap<&str, BTreeMap<UserId, f32>> = BTreeMap::new();
        let mut columns: BTreeSet<UserId> = BTreeSet::new();
        for rating in ratings {
            if !top_books.contains(rating.isbn.as_str()) || !top_users.contains(&rating.user_id) {
                continue;
            }
            pivot
                .entry(rating.isbn.as_str())
                .or_default()
                .insert(rating.user_id, rating.rating as f32);
            columns.insert(rating.user_id);
        }

        let users: Vec<UserId> = columns.into_iter().collect();
        let column_of: HashMap<UserId, usize> =
            users.iter().enumerate().map(|(col, &u)| (u, col)).collect();

        let mut matrix = RatingMatrix {
            users,
            indptr: vec![0],
            ..RatingMatrix::default()
        };
        for (row, (isbn, cells)) in pivot.into_iter().enumerate() {
            for (user_id, value) in cells {
                if value != 0.0 {
                    matrix.indices.push(column_of[&user_id]);
                    matrix.values.push(value);
                }
            }
            matrix.indptr.push(matrix.values.len());
            matrix.row_lookup.insert(isbn.to_string(), row);
            matrix.isbns.push(isbn.to_string());
        }

        debug!(
            "Built {}x{} rating matrix with {} non-zero cells",
            matrix.n_rows(),
            matrix.n_cols(),
            matrix.nnz()
        );
        matrix
    }
}

impl Default for RatingMatrixBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Count ratings per key in parallel
fn count_by<'a, K, F>(ratings: &'a [BookRating], key: F) -> HashMap<K, u32>
where
    K: Eq + Hash + Send,
    F: Fn(&'a BookRating) -> K + Sync + Send,
{
    ratings
        .par_iter()
        .fold(
            HashMap::new,
            |mut local_counts, rating| {
                *local_counts.entry(key(rating)).or_insert(0) += 1;
                local_counts
            },
        )
        .reduce(
            HashMap::new,
            |mut acc, local_counts| {
                for (k, count) in local_counts {
                    *acc.entry(k).or_insert(0) += count;
                }
                acc
            },
        )
}

/// Keep the `n` keys with the highest counts
///
/// Ties are broken by ascending key so the cut is deterministic.
fn most_frequent<K>(counts: HashMap<K, u32>, n: usize) -> HashSet<K>
where
    K: Eq + Hash + Ord,
{
    let mut counts: Vec<(K, u32)> = counts.into_iter().collect();
    counts.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts.truncate(n);
    counts.into_iter().map(|(k, _)| k).collect()
}
