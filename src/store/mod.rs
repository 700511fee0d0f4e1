//! Account Store module
//!
//! Persistence ports for accounts plus the PostgreSQL and in-memory adapters.
//! `with_transaction` is the atomicity boundary used by every ledger operation.

mod error;
mod memory;
mod postgres;

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Account, Balance, Email, NewAccount};

pub use error::StoreError;
pub use memory::MemoryAccountStore;
pub use postgres::PgAccountStore;

/// Persistent collection of accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account; fails with `StoreError::EmailTaken` on a duplicate email.
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, StoreError>;

    /// Open a transactional scope. Dropping it without `commit` rolls it back.
    async fn begin(&self) -> Result<Box<dyn AccountTransaction>, StoreError>;
}

/// Handle on an open transaction.
///
/// Rows returned by `lock_accounts` stay exclusively locked until the
/// transaction ends, so a read-check-write sequence on them cannot interleave
/// with another transaction touching the same rows.
#[async_trait]
pub trait AccountTransaction: Send {
    async fn find_by_email(&mut self, email: &Email) -> Result<Option<Account>, StoreError>;

    /// Lock and return the live rows for `ids`, ordered by id. Missing ids are skipped.
    async fn lock_accounts(&mut self, ids: &[Uuid]) -> Result<Vec<Account>, StoreError>;

    async fn set_points(&mut self, id: Uuid, points: Balance) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/// Future returned by a unit of work passed to [`with_transaction`].
pub type TxFuture<'t, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 't>>;

/// Run `work` inside one transaction.
///
/// Commits when `work` returns `Ok`; rolls back when it returns `Err`. A failed
/// commit is reported as an error and leaves nothing applied.
pub async fn with_transaction<T, E, F>(store: &dyn AccountStore, work: F) -> Result<T, E>
where
    E: From<StoreError>,
    F: for<'t> FnOnce(&'t mut Box<dyn AccountTransaction>) -> TxFuture<'t, T, E>,
{
    let mut tx = store.begin().await?;

    let outcome = work(&mut tx).await;

    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(error = %rollback_err, "Transaction rollback failed");
            }
            Err(err)
        }
    }
}
