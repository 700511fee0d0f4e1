//! Credential Manager
//!
//! Salted, deliberately slow password hashing. Both operations are CPU-bound;
//! request handlers run them on the blocking pool.

use std::sync::OnceLock;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

/// Hash checked when there is no stored hash, built on first use
static DECOY_HASH: OnceLock<Option<String>> = OnceLock::new();

#[derive(Debug, Clone, thiserror::Error)]
pub enum CredentialError {
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// Hashes and verifies passwords with Argon2id. Holds no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialManager;

impl CredentialManager {
    pub fn new() -> Self {
        Self
    }

    /// Hash a password with a fresh random salt, returning a PHC string
    pub fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CredentialError::Hashing(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// A malformed hash is treated as a mismatch.
    pub fn verify(&self, password_hash: &str, plaintext: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(password_hash) else {
            tracing::warn!("Stored password hash is not a valid PHC string");
            return false;
        };

        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// Do the work of `verify` against a decoy hash and report a mismatch.
    ///
    /// Used when no account matched, so that path costs the same as a wrong password.
    pub fn verify_decoy(&self, plaintext: &str) -> bool {
        let decoy = DECOY_HASH.get_or_init(|| self.hash("points-ledger-decoy").ok());

        if let Some(hash) = decoy {
            let _ = self.verify(hash, plaintext);
        }
        false
    }
}
