//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::{AuthError, CredentialError, IssueError};
use crate::domain::{DomainError, TransferError};
use crate::store::StoreError;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    // Server errors (5xx)
    #[error("Storage error: {0}")]
    Store(StoreError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmailTaken(email) => AppError::Domain(DomainError::EmailTaken(email)),
            StoreError::AccountNotFound(id) => AppError::Domain(DomainError::AccountNotFound(id)),
            other => AppError::Store(other),
        }
    }
}

impl From<TransferError> for AppError {
    fn from(err: TransferError) -> Self {
        AppError::Domain(DomainError::Transfer(err))
    }
}

impl From<IssueError> for AppError {
    fn from(err: IssueError) -> Self {
        AppError::Internal(format!("token issue failed: {err}"))
    }
}

/// A body that is not JSON or does not fit the request type is a validation failure
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Domain(DomainError::Validation(rejection.body_text()))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("blocking task failed: {err}"))
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    /// HTTP status and stable machine-readable code
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Auth(err) => {
                let code = match err {
                    AuthError::MissingToken => "missing_token",
                    AuthError::Invalid => "invalid_token",
                    AuthError::Expired => "token_expired",
                    AuthError::InvalidCredentials => "invalid_credentials",
                };
                (StatusCode::UNAUTHORIZED, code)
            }
            AppError::Domain(err) => match err {
                DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                DomainError::EmailTaken(_) => (StatusCode::CONFLICT, "email_taken"),
                DomainError::AccountNotFound(_) | DomainError::EmailNotFound(_) => {
                    (StatusCode::NOT_FOUND, "account_not_found")
                }
                DomainError::Transfer(TransferError::InvalidAmount(_)) => {
                    (StatusCode::BAD_REQUEST, "invalid_amount")
                }
                DomainError::Transfer(TransferError::InsufficientFunds { .. }) => {
                    (StatusCode::BAD_REQUEST, "insufficient_funds")
                }
                DomainError::Transfer(TransferError::SelfTransfer) => {
                    (StatusCode::BAD_REQUEST, "self_transfer")
                }
            },
            AppError::Store(_)
            | AppError::Credential(_)
            | AppError::Internal(_)
            | AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        let (error, details) = match &self {
            AppError::Domain(err) => (self.to_string(), domain_details(err)),
            AppError::Auth(_) => (self.to_string(), None),
            // Never leak storage or hashing internals
            _ => {
                tracing::error!(error = ?self, "Request failed with internal error");
                ("Internal server error".to_string(), None)
            }
        };

        let body = ErrorResponse {
            error,
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

fn domain_details(err: &DomainError) -> Option<String> {
    match err {
        DomainError::Validation(msg) => Some(msg.clone()),
        DomainError::EmailTaken(email) | DomainError::EmailNotFound(email) => Some(email.clone()),
        DomainError::AccountNotFound(id) => Some(id.to_string()),
        DomainError::Transfer(TransferError::InvalidAmount(msg)) => Some(msg.clone()),
        DomainError::Transfer(TransferError::InsufficientFunds {
            required,
            available,
        }) => Some(format!("required {required}, available {available}")),
        DomainError::Transfer(TransferError::SelfTransfer) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use uuid::Uuid;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_insufficient_funds_response() {
        let (status, body) = render(DomainError::insufficient_funds(50, 10).into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_code"], "insufficient_funds");
        assert_eq!(body["details"], "required 50, available 10");
    }

    #[tokio::test]
    async fn test_store_conflict_maps_to_409() {
        let err: AppError = StoreError::EmailTaken("alice@x.com".to_string()).into();
        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error_code"], "email_taken");
    }

    #[tokio::test]
    async fn test_auth_errors_map_to_401() {
        for (err, code) in [
            (AuthError::MissingToken, "missing_token"),
            (AuthError::Invalid, "invalid_token"),
            (AuthError::Expired, "token_expired"),
            (AuthError::InvalidCredentials, "invalid_credentials"),
        ] {
            let (status, body) = render(err.into()).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["error_code"], code);
        }
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let err = AppError::Store(StoreError::CorruptRow {
            id: Uuid::nil(),
            reason: "points -3".to_string(),
        });
        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error_code"], "internal_error");
        assert_eq!(body["error"], "Internal server error");
        assert!(body.get("details").is_none());
    }
}
