//! Operation Context
//!
//! Contains metadata about the current operation for tracing.

use uuid::Uuid;

/// Context for an operation, attached to log lines of ledger operations.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    /// Account authenticated by the bearer token
    pub account_id: Option<Uuid>,

    /// Correlation ID for request tracing (the `x-request-id` header)
    pub correlation_id: Option<String>,
}

impl OperationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }
}
