//! Server crate for the book recommender.
//!
//! This crate contains the orchestrator that serves recommendations from
//! a lazily built similarity index, the per-session state with its view
//! routing, and the application configuration.

pub mod app;
pub mod config;
pub mod links;
pub mod orchestrator;
pub mod session;

pub use app::AppContext;
pub use config::{AppConfig, CredentialScheme};
pub use links::{purchase_links, PurchaseLinks};
pub use orchestrator::{BookRecommendation, BookRecommender, SimilarBook, SimilarityIndex};
pub use session::{Session, View};
