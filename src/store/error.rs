//! Account Store Errors
//!
//! Error types for account persistence.

use uuid::Uuid;

/// Errors that can occur in the account store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique index on `email` rejected the insert
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// Row targeted by an update does not exist
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Persisted row violates a domain invariant
    #[error("Corrupt account row {id}: {reason}")]
    CorruptRow { id: Uuid, reason: String },
}
