//! # Recommendation Orchestrator
//!
//! Coordinates one "show recommendation" request:
//! 1. Get the similarity index, building it if missing or stale
//! 2. Resolve the title to an ISBN, and the ISBN to a matrix row
//! 3. Query the nearest rows
//! 4. Map rows back to titles
//! 5. Fetch a poster for each title
//!
//! The index (catalog + rating matrix + fitted model) is built lazily on
//! the first request and kept until it is invalidated explicitly or the
//! dataset files change on disk.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use data_loader::{Catalog, DatasetFingerprint, Isbn};
use poster_client::PosterFetcher;
use similarity::{CosineNeighbors, RatingMatrixBuilder};

use crate::config::AppConfig;
use crate::links::{purchase_links, PurchaseLinks};

/// One suggested book
#[derive(Debug, Clone)]
pub struct BookRecommendation {
    pub isbn: Isbn,
    pub title: String,
    /// Cosine distance to the queried book
    pub distance: f64,
    pub poster: Option<String>,
    pub links: PurchaseLinks,
}

/// A nearest-neighbor hit resolved to catalog metadata
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarBook {
    pub isbn: Isbn,
    pub title: String,
    pub distance: f64,
}

/// Catalog plus the model fitted on its ratings
pub struct SimilarityIndex {
    catalog: Arc<Catalog>,
    model: CosineNeighbors,
    book_titles: Vec<String>,
}

impl SimilarityIndex {
    /// Build the rating matrix and fit the model
    pub fn build(catalog: Arc<Catalog>, builder: &RatingMatrixBuilder) -> Self {
        let model = CosineNeighbors::fit(builder.build(catalog.ratings()));

        // Selector list: titles of books that made it into the matrix,
        // first occurrence wins
        let mut seen = HashSet::new();
        let book_titles = catalog
            .books()
            .iter()
            .filter(|book| !book.title.is_empty() && model.matrix().contains(&book.isbn))
            .filter(|book| seen.insert(book.title.as_str()))
            .map(|book| book.title.clone())
            .collect();

        Self {
            catalog,
            model,
            book_titles,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn model(&self) -> &CosineNeighbors {
        &self.model
    }

    /// Titles that can be asked for recommendations
    pub fn book_titles(&self) -> &[String] {
        &self.book_titles
    }

    /// Case-insensitive title search over the selector list
    ///
    /// Exact matches come first, then substring matches in list order.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();
        let mut exact = Vec::new();
        let mut partial = Vec::new();
        for title in &self.book_titles {
            let lower = title.to_lowercase();
            if lower == query {
                exact.push(title.as_str());
            } else if lower.contains(&query) {
                partial.push(title.as_str());
            }
        }
        exact.extend(partial);
        exact
    }

    /// Up to `k` nearest books to `title`, the book itself included
    ///
    /// Empty when the title is unknown, its ISBN isn't a matrix row, or
    /// the row lookup fails. Neighbors without a catalog title are dropped.
    pub fn similar_books(&self, title: &str, k: usize) -> Vec<SimilarBook> {
        let Some(isbn) = self.catalog.isbn_of(title) else {
            debug!("Unknown title {:?}", title);
            return Vec::new();
        };
        let Some(row) = self.model.matrix().row_of(isbn) else {
            debug!("ISBN {} is not in the rating matrix", isbn);
            return Vec::new();
        };
        let Some(neighbors) = self.model.kneighbors(row, k) else {
            return Vec::new();
        };

        neighbors
            .into_iter()
            .filter_map(|neighbor| {
                let isbn = self.model.matrix().isbn_at(neighbor.row)?;
                let title = self.catalog.title_of(isbn)?;
                Some(SimilarBook {
                    isbn: isbn.to_string(),
                    title: title.to_string(),
                    distance: neighbor.distance,
                })
            })
            .collect()
    }
}

/// Where the catalog comes from
#[derive(Clone)]
enum CatalogSource {
    /// BX files on disk, reloaded when their fingerprint changes
    Files(PathBuf),
    /// Already in memory; only `invalidate` triggers a rebuild
    Loaded(Arc<Catalog>),
}

impl CatalogSource {
    fn fingerprint(&self) -> Result<Option<DatasetFingerprint>> {
        match self {
            CatalogSource::Files(dir) => Ok(Some(
                DatasetFingerprint::capture(dir).context("Failed to stat dataset files")?,
            )),
            CatalogSource::Loaded(_) => Ok(None),
        }
    }

    fn load(&self) -> Result<Arc<Catalog>> {
        match self {
            CatalogSource::Files(dir) => Ok(Arc::new(
                Catalog::load_from_files(dir).context("Failed to load Book-Crossing dataset")?,
            )),
            CatalogSource::Loaded(catalog) => Ok(catalog.clone()),
        }
    }
}

struct CachedIndex {
    index: Arc<SimilarityIndex>,
    fingerprint: Option<DatasetFingerprint>,
}

/// Application-lifetime recommender: owns the lazy index and the poster cache
pub struct BookRecommender {
    source: CatalogSource,
    matrix_builder: RatingMatrixBuilder,
    neighbors: usize,
    posters: PosterFetcher,
    cached: Mutex<Option<CachedIndex>>,
    builds: AtomicUsize,
}

impl BookRecommender {
    /// Recommender over the dataset files named in `config`
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::with_source(
            CatalogSource::Files(config.data_dir.clone()),
            config.matrix_builder(),
            config.neighbors,
            config.poster_fetcher()?,
        ))
    }

    /// Recommender over an in-memory catalog
    pub fn from_catalog(
        catalog: Catalog,
        matrix_builder: RatingMatrixBuilder,
        neighbors: usize,
        posters: PosterFetcher,
    ) -> Self {
        Self::with_source(
            CatalogSource::Loaded(Arc::new(catalog)),
            matrix_builder,
            neighbors,
            posters,
        )
    }

    fn with_source(
        source: CatalogSource,
        matrix_builder: RatingMatrixBuilder,
        neighbors: usize,
        posters: PosterFetcher,
    ) -> Self {
        Self {
            source,
            matrix_builder,
            neighbors,
            posters,
            cached: Mutex::new(None),
            builds: AtomicUsize::new(0),
        }
    }

    /// Current index, (re)built if missing or stale
    pub async fn index(&self) -> Result<Arc<SimilarityIndex>> {
        let mut cached = self.cached.lock().await;
        let fingerprint = self.source.fingerprint()?;

        if let Some(current) = cached.as_ref()
            && current.fingerprint == fingerprint
        {
            return Ok(current.index.clone());
        }

        let start = Instant::now();
        let source = self.source.clone();
        let builder = self.matrix_builder.clone();
        // loading and pivoting are CPU-bound
        let index = tokio::task::spawn_blocking(move || -> Result<SimilarityIndex> {
            let catalog = source.load()?;
            Ok(SimilarityIndex::build(catalog, &builder))
        })
        .await
        .context("Index build task panicked")??;
        let index = Arc::new(index);

        self.builds.fetch_add(1, Ordering::SeqCst);
        info!(
            "Built similarity index: {} rows x {} users, {} selectable titles in {:.2?}",
            index.model().matrix().n_rows(),
            index.model().matrix().n_cols(),
            index.book_titles().len(),
            start.elapsed()
        );

        *cached = Some(CachedIndex {
            index: index.clone(),
            fingerprint,
        });
        Ok(index)
    }

    /// Drop the cached index; the next request rebuilds it
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
        debug!("Similarity index invalidated");
    }

    /// Neighbors requested per query
    pub fn neighbors(&self) -> usize {
        self.neighbors
    }

    /// How many times the index has been built
    pub fn index_builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    /// Titles for the book selector
    pub async fn book_titles(&self) -> Result<Vec<String>> {
        Ok(self.index().await?.book_titles().to_vec())
    }

    /// Selector titles matching a search string
    pub async fn search(&self, query: &str) -> Result<Vec<String>> {
        let index = self.index().await?;
        Ok(index.search(query).into_iter().map(str::to_string).collect())
    }

    /// Poster for one title (used for the selected book's cover)
    pub async fn poster(&self, title: &str) -> Option<String> {
        self.posters.fetch_poster(title).await
    }

    /// Books similar to `title`, each with a poster slot
    ///
    /// An unknown or unindexed title yields an empty list, not an error.
    /// Errors only come from building the index.
    #[instrument(skip(self))]
    pub async fn recommend(&self, title: &str) -> Result<Vec<BookRecommendation>> {
        let start = Instant::now();
        let index = self.index().await?;

        let similar = index.similar_books(title, self.neighbors);
        let mut recommendations = Vec::with_capacity(similar.len());
        for book in similar {
            let poster = self.posters.fetch_poster(&book.title).await;
            recommendations.push(BookRecommendation {
                links: purchase_links(&book.title),
                isbn: book.isbn,
                title: book.title,
                distance: book.distance,
                poster,
            });
        }

        info!(
            "{} recommendations for {:?} in {:.2?}",
            recommendations.len(),
            title,
            start.elapsed()
        );
        Ok(recommendations)
    }

    /// Same result as [`recommend`](Self::recommend), split into parallel
    /// title and poster lists
    pub async fn recommend_lists(&self, title: &str) -> Result<(Vec<String>, Vec<Option<String>>)> {
        Ok(self
            .recommend(title)
            .await?
            .into_iter()
            .map(|rec| (rec.title, rec.poster))
            .unzip())
    }
}
