//! Accounts: registered users and their reviews, both kept in flat files.
//!
//! This crate provides:
//! - CredentialVerifier trait and implementations for password handling
//! - CredentialStore for registration and login
//! - ReviewStore for the append-only review log
//!
//! ## Example Usage
//! ```ignore
//! use accounts::{CredentialStore, BcryptVerifier, ReviewStore, StarRating};
//!
//! let users = CredentialStore::new("users.csv").with_verifier(BcryptVerifier::default());
//! users.register(form)?;
//! let me = users.login("asha", "secret")?;
//!
//! let reviews = ReviewStore::new("reviews.csv");
//! reviews.submit(&me.username, "Clara Callan", StarRating::try_from(4)?, "Great")?;
//! ```

pub mod error;
pub mod traits;
pub mod verifiers;
pub mod credentials;
pub mod reviews;
mod tabular;

// Re-export main types
pub use error::{AccountError, Result};
pub use traits::CredentialVerifier;
pub use verifiers::{BcryptVerifier, PlaintextVerifier};
pub use credentials::{CredentialStore, Gender, NewUser, UserRecord};
pub use reviews::{Review, ReviewStore, StarRating};
