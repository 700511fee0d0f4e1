//! Auth Handler
//!
//! Registration, login and bearer-token authentication.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::{AuthError, CredentialManager, TokenService};
use crate::domain::{parse_birthday, Account, Balance, DomainError, Email, NewAccount};
use crate::error::AppError;
use crate::state::AppState;
use crate::store::AccountStore;

use super::RegisterCommand;

/// Handler for the account lifecycle up to an authenticated identity
pub struct AuthHandler {
    store: Arc<dyn AccountStore>,
    credentials: CredentialManager,
    tokens: Arc<TokenService>,
    starter_points: Balance,
}

impl AuthHandler {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: Arc::clone(&state.store),
            credentials: state.credentials,
            tokens: Arc::clone(&state.tokens),
            starter_points: state.starter_points,
        }
    }

    /// Create an account holding the starter grant
    pub async fn register(&self, command: RegisterCommand) -> Result<Account, AppError> {
        let email = Email::parse(&command.email)?;
        if command.password.is_empty() {
            return Err(DomainError::validation("password is required").into());
        }

        let credentials = self.credentials;
        let password = command.password;
        let password_hash =
            tokio::task::spawn_blocking(move || credentials.hash(&password)).await??;

        let new_account = NewAccount {
            id: Uuid::new_v4(),
            email,
            password_hash,
            first_name: command.first_name,
            last_name: command.last_name,
            phone: command.phone,
            birthday: parse_birthday(command.birthday.as_deref()),
            points: self.starter_points,
            created_at: Utc::now(),
        };

        let account = self.store.create(new_account).await?;

        tracing::info!(
            account_id = %account.id,
            email = %account.email,
            points = %account.points,
            "Account registered"
        );

        Ok(account)
    }

    /// Exchange email and password for a bearer token.
    ///
    /// Unknown email, malformed email and wrong password all yield
    /// `AuthError::InvalidCredentials`.
    pub async fn login(&self, email: &str, password: String) -> Result<String, AppError> {
        let account = match Email::parse(email) {
            Ok(email) => self.store.find_by_email(&email).await?,
            Err(_) => None,
        };

        // Every path runs one Argon2 verification
        let credentials = self.credentials;
        let stored_hash = account.as_ref().map(|a| a.password_hash.clone());
        let verified = tokio::task::spawn_blocking(move || match stored_hash {
            Some(hash) => credentials.verify(&hash, &password),
            None => credentials.verify_decoy(&password),
        })
        .await?;

        let account = match account {
            Some(account) if verified => account,
            Some(account) => {
                tracing::info!(account_id = %account.id, "Login rejected");
                return Err(AuthError::InvalidCredentials.into());
            }
            None => return Err(AuthError::InvalidCredentials.into()),
        };

        let token = self.tokens.issue(account.id)?;
        tracing::info!(account_id = %account.id, "Login succeeded");

        Ok(token)
    }

    /// Resolve a bearer token to the account id it was issued for
    pub fn authenticate(&self, token: &str) -> Result<Uuid, AuthError> {
        self.tokens.verify(token).map(|claims| claims.sub)
    }

    /// Load the account behind an authenticated id
    pub async fn profile(&self, account_id: Uuid) -> Result<Account, AppError> {
        self.store
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| DomainError::AccountNotFound(account_id).into())
    }
}
