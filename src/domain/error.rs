//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;
use uuid::Uuid;

/// Business rule violations raised by the auth gateway and the ledger.
///
/// These are recovered at the service boundary and rendered as structured
/// client errors; none of them is ever retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Malformed input (bad email, missing password)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Email already registered
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// No account behind the given id
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// No account behind the given email
    #[error("No account registered for {0}")]
    EmailNotFound(String),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}

/// Transfer-specific rejections
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransferError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("Cannot transfer to the same account")]
    SelfTransfer,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn insufficient_funds(required: i64, available: i64) -> Self {
        Self::Transfer(TransferError::InsufficientFunds {
            required,
            available,
        })
    }
}

impl From<super::AmountError> for TransferError {
    fn from(err: super::AmountError) -> Self {
        TransferError::InvalidAmount(err.to_string())
    }
}
