//! Core trait for password handling.
//!
//! The credential store never compares passwords itself; it hands the
//! candidate password and the stored column value to a verifier. Swapping
//! plaintext storage for a hashed scheme only means swapping the verifier.

use crate::error::Result;

/// Turns passwords into stored values and checks candidates against them.
///
/// `Send + Sync` so a store can be shared across tasks.
pub trait CredentialVerifier: Send + Sync {
    /// Returns the name of this scheme (for logging/debugging)
    fn name(&self) -> &str;

    /// Produce the value written to the Password column at registration
    fn seal(&self, password: &str) -> Result<String>;

    /// Check a login attempt against a stored Password value
    fn verify(&self, password: &str, stored: &str) -> bool;
}
