//! In-memory account store
//!
//! Backs tests and `STORAGE_BACKEND=memory`. An open transaction holds the
//! store-wide mutex until it ends, so transactions are fully serialized and
//! staged writes become visible only on commit.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::{Account, Balance, Email, NewAccount};

use super::{AccountStore, AccountTransaction, StoreError};

type Accounts = HashMap<Uuid, Account>;

#[derive(Debug, Clone, Default)]
pub struct MemoryAccountStore {
    accounts: Arc<Mutex<Accounts>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all balances. Used to check conservation in tests.
    pub async fn total_points(&self) -> i64 {
        self.accounts
            .lock()
            .await
            .values()
            .map(|account| account.points.value())
            .sum()
    }
}

fn find_email(accounts: &Accounts, email: &Email) -> Option<Account> {
    accounts.values().find(|a| &a.email == email).cloned()
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.lock().await;

        if find_email(&accounts, &account.email).is_some() {
            return Err(StoreError::EmailTaken(account.email.into_inner()));
        }

        let account = account.into_account();
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.lock().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, StoreError> {
        Ok(find_email(&*self.accounts.lock().await, email))
    }

    async fn begin(&self) -> Result<Box<dyn AccountTransaction>, StoreError> {
        let guard = Arc::clone(&self.accounts).lock_owned().await;
        Ok(Box::new(MemoryTransaction {
            guard,
            staged: HashMap::new(),
        }))
    }
}

struct MemoryTransaction {
    guard: OwnedMutexGuard<Accounts>,
    staged: HashMap<Uuid, Balance>,
}

impl MemoryTransaction {
    /// Row as seen by this transaction, staged writes included
    fn view(&self, account: &Account) -> Account {
        let mut account = account.clone();
        if let Some(points) = self.staged.get(&account.id) {
            account.points = *points;
        }
        account
    }
}

#[async_trait]
impl AccountTransaction for MemoryTransaction {
    async fn find_by_email(&mut self, email: &Email) -> Result<Option<Account>, StoreError> {
        Ok(find_email(&self.guard, email).map(|account| self.view(&account)))
    }

    async fn lock_accounts(&mut self, ids: &[Uuid]) -> Result<Vec<Account>, StoreError> {
        let mut locked: Vec<Account> = ids
            .iter()
            .filter_map(|id| self.guard.get(id))
            .map(|account| self.view(account))
            .collect();
        locked.sort_by_key(|account| account.id);
        locked.dedup_by_key(|account| account.id);
        Ok(locked)
    }

    async fn set_points(&mut self, id: Uuid, points: Balance) -> Result<(), StoreError> {
        if !self.guard.contains_key(&id) {
            return Err(StoreError::AccountNotFound(id));
        }
        self.staged.insert(id, points);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTransaction { mut guard, staged } = *self;
        for (id, points) in staged {
            if let Some(account) = guard.get_mut(&id) {
                account.points = points;
            }
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
