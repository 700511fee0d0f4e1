//! Token Service
//!
//! Issues and verifies HS256 bearer tokens carrying a typed [`Claims`]
//! payload. The signing secret is injected at construction and never changes
//! for the life of the service. Anyone holding it can mint tokens for any
//! account. There is no revocation: a token is accepted until it expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authentication failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token")]
    Invalid,

    #[error("Token expired")]
    Expired,

    /// Unknown email or wrong password; the two are deliberately indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// Failure to produce a token
#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error("Token expiry out of range")]
    ExpiryOutOfRange,

    #[error(transparent)]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id of the bearer
    pub sub: Uuid,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let key = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            ttl,
        }
    }

    /// Issue a token for `account_id` expiring after the configured TTL
    pub fn issue(&self, account_id: Uuid) -> Result<String, IssueError> {
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or(IssueError::ExpiryOutOfRange)?;

        self.issue_with_expiry(account_id, expires_at)
    }

    /// Issue a token with an explicit absolute expiry
    pub fn issue_with_expiry(
        &self,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<String, IssueError> {
        let claims = Claims {
            sub: account_id,
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Check signature and expiry, returning the typed claims
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => {
                    tracing::debug!(error = %e, "Rejected bearer token");
                    AuthError::Invalid
                }
            })
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("key", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}
