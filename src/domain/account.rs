//! Account entity
//!
//! The single persisted record of the service: identity, profile and points.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::{Balance, DomainError};

/// Date stored when a birthday is missing or cannot be parsed (`0001-01-01`).
pub fn zero_birthday() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}

const BIRTHDAY_FORMAT: &str = "%Y-%m-%d";

/// Normalized email address.
///
/// Emails are trimmed and lowercased on construction, so uniqueness and
/// every lookup (login, transfer receiver) are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_lowercase();

        let (local, domain) = normalized
            .split_once('@')
            .ok_or_else(|| DomainError::validation("email must contain '@'"))?;

        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(DomainError::validation(format!(
                "malformed email address: {raw}"
            )));
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("email must not contain whitespace"));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a `YYYY-MM-DD` birthday, falling back to [`zero_birthday`].
///
/// A malformed birthday never aborts registration.
pub fn parse_birthday(raw: Option<&str>) -> NaiveDate {
    raw.map(str::trim)
        .and_then(|s| NaiveDate::parse_from_str(s, BIRTHDAY_FORMAT).ok())
        .unwrap_or_else(zero_birthday)
}

/// A user's persisted identity plus point balance.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub email: Email,
    /// PHC string from the credential manager; never leaves the service.
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub birthday: NaiveDate,
    pub points: Balance,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to insert a new account row.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub id: Uuid,
    pub email: Email,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub birthday: NaiveDate,
    pub points: Balance,
    pub created_at: DateTime<Utc>,
}

impl NewAccount {
    pub fn into_account(self) -> Account {
        Account {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            birthday: self.birthday,
            points: self.points,
            created_at: self.created_at,
        }
    }
}
