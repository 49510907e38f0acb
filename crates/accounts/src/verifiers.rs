//! Credential verifier implementations.

use crate::error::Result;
use crate::traits::CredentialVerifier;

/// Stores and compares passwords verbatim.
///
/// This is the format existing `users.csv` files use, so it stays the
/// default. It offers no protection for the file's contents.
pub struct PlaintextVerifier;

impl CredentialVerifier for PlaintextVerifier {
    fn name(&self) -> &str {
        "PlaintextVerifier"
    }

    fn seal(&self, password: &str) -> Result<String> {
        Ok(password.to_string())
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        password == stored
    }
}

/// Stores bcrypt hashes in the Password column.
pub struct BcryptVerifier {
    cost: u32,
}

impl BcryptVerifier {
    /// Create a verifier with the given bcrypt cost (4-31)
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptVerifier {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl CredentialVerifier for BcryptVerifier {
    fn name(&self) -> &str {
        "BcryptVerifier"
    }

    fn seal(&self, password: &str) -> Result<String> {
        Ok(bcrypt::hash(password, self.cost)?)
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        // a plaintext row left over from before the switch is not a valid
        // hash and simply fails to verify
        bcrypt::verify(password, stored).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plaintext_roundtrip() {
        let verifier = PlaintextVerifier;
        let stored = verifier.seal("hunter2").unwrap();

        assert_eq!(stored, "hunter2");
        assert!(verifier.verify("hunter2", &stored));
        assert!(!verifier.verify("Hunter2", &stored));
    }

    #[test]
    fn test_bcrypt_hashes_and_verifies() {
        // minimum cost keeps the test fast
        let verifier = BcryptVerifier::new(4);
        let stored = verifier.seal("hunter2").unwrap();

        assert_ne!(stored, "hunter2");
        assert!(verifier.verify("hunter2", &stored));
        assert!(!verifier.verify("wrong", &stored));
    }

    #[test]
    fn test_bcrypt_rejects_plaintext_rows() {
        let verifier = BcryptVerifier::new(4);
        assert!(!verifier.verify("hunter2", "hunter2"));
    }
}
