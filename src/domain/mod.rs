//! Domain module
//!
//! Core domain types and business rules.

pub mod account;
pub mod amount;
pub mod context;
pub mod error;

pub use account::{parse_birthday, zero_birthday, Account, Email, NewAccount};
pub use amount::{Amount, AmountError, Balance};
pub use context::OperationContext;
pub use error::{DomainError, TransferError};
