//! points_ledger Library
//!
//! Re-exports modules for integration testing and the server binary.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod state;
pub mod store;

mod error;

pub use config::Config;
pub use domain::{Account, Amount, AmountError, Balance, DomainError, Email, TransferError};
pub use error::{AppError, ErrorResponse};
pub use state::AppState;
