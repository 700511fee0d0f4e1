//! Command Handlers module
//!
//! Handlers that orchestrate business operations over the account store.

mod auth_handler;
mod commands;
mod transfer_handler;

#[cfg(test)]
mod tests;

pub use auth_handler::AuthHandler;
pub use commands::*;
pub use transfer_handler::TransferHandler;
