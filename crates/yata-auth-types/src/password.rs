//! Salted one-way password digest.

use constant_time_eq::constant_time_eq;
use sha2::{Digest, Sha256};

/// Deterministic salted SHA-256 digest, hex encoded (64 lower-case chars).
///
/// The salt is process-wide configuration injected at construction.
#[derive(Clone)]
pub struct PasswordHasher {
    salt: String,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("salt", &"<redacted>")
            .finish()
    }
}

impl PasswordHasher {
    pub fn new(salt: impl Into<String>) -> Self {
        Self { salt: salt.into() }
    }

    pub fn hash(&self, plaintext: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.salt.as_bytes());
        hasher.update(plaintext.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Re-derive the digest of `plaintext` and compare it with `digest`.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        constant_time_eq(self.hash(plaintext).as_bytes(), digest.as_bytes())
    }
}
