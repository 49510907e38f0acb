//! Cover-image lookup against a public book search API.
//!
//! This crate provides:
//! - A client for the Google Books volume search endpoint
//! - Extraction of `items[0].volumeInfo.imageLinks.thumbnail` from the response
//! - A per-title memoizing fetcher with a bounded LRU cache
//!
//! Failures never reach the caller: a network error, a bad status, a
//! malformed body or a missing field all come back as "no poster".

use async_trait::async_trait;
use lru::LruCache;
use serde_json::Value;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Public Google Books host
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

/// Default number of titles kept in the poster cache
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Errors that can occur when looking up a cover image
#[derive(Error, Debug)]
pub enum PosterClientError {
    #[error("Request to book search API failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Book search API returned status {0}")]
    Status(u16),

    #[error("Invalid response from book search API: {0}")]
    InvalidResponse(String),
}

/// Anything that can turn a title into a thumbnail URL.
///
/// The production implementation is [`GoogleBooksClient`]; tests plug in
/// counting fakes.
#[async_trait]
pub trait VolumeLookup: Send + Sync {
    async fn thumbnail(&self, title: &str) -> Result<String, PosterClientError>;
}

/// Client for the volume search endpoint
pub struct GoogleBooksClient {
    http: reqwest::Client,
    base_url: String,
}

impl GoogleBooksClient {
    /// Build a client for `base_url` (e.g. "https://www.googleapis.com")
    ///
    /// No timeout unless one is given; there are no retries either way.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, PosterClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let base_url = base_url.into();
        info!("Poster lookups will use {}", base_url);

        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The GET request for a title; the query is form-encoded so spaces
    /// become `+`
    pub fn search_request(&self, title: &str) -> Result<reqwest::Request, PosterClientError> {
        Ok(self
            .http
            .get(format!("{}/books/v1/volumes", self.base_url))
            .query(&[("q", title)])
            .build()?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl VolumeLookup for GoogleBooksClient {
    async fn thumbnail(&self, title: &str) -> Result<String, PosterClientError> {
        let request = self.search_request(title)?;
        debug!("GET {}", request.url());

        let response = self.http.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PosterClientError::Status(status.as_u16()));
        }
        let body: Value = response.json().await?;
        extract_thumbnail(&body)
    }
}

/// Pull `items[0].volumeInfo.imageLinks.thumbnail` out of a search response
/// and upgrade it to https
pub fn extract_thumbnail(body: &Value) -> Result<String, PosterClientError> {
    let thumbnail = body
        .pointer("/items/0/volumeInfo/imageLinks/thumbnail")
        .ok_or_else(|| PosterClientError::InvalidResponse("no thumbnail in first item".into()))?
        .as_str()
        .ok_or_else(|| PosterClientError::InvalidResponse("thumbnail is not a string".into()))?;
    Ok(secure_url(thumbnail))
}

/// Rewrite an `http:` link to `https:`
pub fn secure_url(url: &str) -> String {
    match url.strip_prefix("http:") {
        Some(rest) => format!("https:{}", rest),
        None => url.to_string(),
    }
}

/// Memoizing poster fetcher.
///
/// Each distinct title hits the lookup at most once while it stays in the
/// cache, failures included. The cache holds `capacity` titles and evicts
/// the least recently used one when full.
#[derive(Clone)]
pub struct PosterFetcher {
    lookup: Arc<dyn VolumeLookup>,
    cache: Arc<Mutex<LruCache<String, Option<String>>>>,
}

impl PosterFetcher {
    /// Create a fetcher; a capacity of 0 is treated as 1
    pub fn new(lookup: impl VolumeLookup + 'static, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            lookup: Arc::new(lookup),
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Cover URL for a title, or `None` if there isn't one
    pub async fn fetch_poster(&self, title: &str) -> Option<String> {
        let cached = self.lock_cache().get(title).cloned();
        if let Some(poster) = cached {
            debug!("Poster cache hit for {:?}", title);
            return poster;
        }

        // the lock is not held across the request
        let poster = match self.lookup.thumbnail(title).await {
            Ok(url) => Some(url),
            Err(e) => {
                debug!("No poster for {:?}: {}", title, e);
                None
            }
        };

        self.lock_cache().put(title.to_string(), poster.clone());
        poster
    }

    /// Number of titles currently cached
    pub fn cached_titles(&self) -> usize {
        self.lock_cache().len()
    }

    fn lock_cache(&self) -> MutexGuard<'_, LruCache<String, Option<String>>> {
        // a panic while holding the lock can't leave the cache inconsistent
        match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
