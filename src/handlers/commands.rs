//! Command definitions
//!
//! Commands represent intentions to change the system state.

use serde::Deserialize;
use uuid::Uuid;

/// Command to register a new account, also the `/register` request body
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterCommand {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    /// `YYYY-MM-DD`; anything else is stored as the zero date
    #[serde(default)]
    pub birthday: Option<String>,
}

impl RegisterCommand {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            first_name: String::new(),
            last_name: String::new(),
            phone: String::new(),
            birthday: None,
        }
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_birthday(mut self, birthday: impl Into<String>) -> Self {
        self.birthday = Some(birthday.into());
        self
    }
}

/// Command to move points from the authenticated account to another
#[derive(Debug, Clone)]
pub struct TransferCommand {
    /// Authenticated sender
    pub sender_id: Uuid,
    /// Receiver, looked up case-insensitively
    pub receiver_email: String,
    pub amount: i64,
}

impl TransferCommand {
    pub fn new(sender_id: Uuid, receiver_email: impl Into<String>, amount: i64) -> Self {
        Self {
            sender_id,
            receiver_email: receiver_email.into(),
            amount,
        }
    }
}

/// Result of a successful transfer
#[derive(Debug, Clone, PartialEq)]
pub struct TransferResult {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub amount: i64,
    pub sender_balance: i64,
    pub receiver_balance: i64,
}
