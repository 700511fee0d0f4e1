//! PostgreSQL account store
//!
//! `accounts` rows are read and written with plain SQL through sqlx. Inside a
//! transaction, `lock_accounts` takes `FOR UPDATE` row locks in id order.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{Account, Balance, Email, NewAccount};

use super::{AccountStore, AccountTransaction, StoreError};

const ACCOUNT_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, phone, birthday, points, created_at";

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    phone: String,
    birthday: NaiveDate,
    points: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| StoreError::CorruptRow {
            id: row.id,
            reason: e.to_string(),
        })?;
        let points = Balance::new(row.points).map_err(|e| StoreError::CorruptRow {
            id: row.id,
            reason: e.to_string(),
        })?;

        Ok(Account {
            id: row.id,
            email,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            birthday: row.birthday,
            points,
            created_at: row.created_at,
        })
    }
}

fn into_account(row: Option<AccountRow>) -> Result<Option<Account>, StoreError> {
    row.map(Account::try_from).transpose()
}

/// Account store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts
                (id, email, password_hash, first_name, last_name, phone, birthday, points, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(account.id)
        .bind(account.email.as_str())
        .bind(&account.password_hash)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.phone)
        .bind(account.birthday)
        .bind(account.points.value())
        .bind(account.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(account.into_account()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::EmailTaken(account.email.into_inner()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let row: Option<AccountRow> =
            sqlx::query_as(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        into_account(row)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, StoreError> {
        let row: Option<AccountRow> =
            sqlx::query_as(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"))
                .bind(email.as_str())
                .fetch_optional(&self.pool)
                .await?;

        into_account(row)
    }

    async fn begin(&self) -> Result<Box<dyn AccountTransaction>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgAccountTransaction { tx }))
    }
}

/// Open PostgreSQL transaction; sqlx rolls it back if dropped uncommitted.
struct PgAccountTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl AccountTransaction for PgAccountTransaction {
    async fn find_by_email(&mut self, email: &Email) -> Result<Option<Account>, StoreError> {
        let row: Option<AccountRow> =
            sqlx::query_as(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"))
                .bind(email.as_str())
                .fetch_optional(&mut *self.tx)
                .await?;

        into_account(row)
    }

    async fn lock_accounts(&mut self, ids: &[Uuid]) -> Result<Vec<Account>, StoreError> {
        // Fixed lock order keeps opposite-direction transfers from deadlocking
        let rows: Vec<AccountRow> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ANY($1) ORDER BY id FOR UPDATE"
        ))
        .bind(ids)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(Account::try_from).collect()
    }

    async fn set_points(&mut self, id: Uuid, points: Balance) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE accounts SET points = $1 WHERE id = $2")
            .bind(points.value())
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() != 1 {
            return Err(StoreError::AccountNotFound(id));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
