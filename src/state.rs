//! Shared application state
//!
//! Built once at startup and cloned into every request.

use std::sync::Arc;

use crate::auth::{CredentialManager, TokenService};
use crate::config::Config;
use crate::domain::Balance;
use crate::error::AppError;
use crate::store::AccountStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AccountStore>,
    pub credentials: CredentialManager,
    pub tokens: Arc<TokenService>,
    /// Points granted to every new account
    pub starter_points: Balance,
}

impl AppState {
    pub fn new(store: Arc<dyn AccountStore>, tokens: TokenService, starter_points: Balance) -> Self {
        Self {
            store,
            credentials: CredentialManager::new(),
            tokens: Arc::new(tokens),
            starter_points,
        }
    }

    /// Wire the token service and starter grant from configuration
    pub fn from_config(store: Arc<dyn AccountStore>, config: &Config) -> Result<Self, AppError> {
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl);
        let starter_points = Balance::new(config.starter_points)
            .map_err(|e| AppError::Internal(format!("invalid starter grant: {e}")))?;

        Ok(Self::new(store, tokens, starter_points))
    }
}
