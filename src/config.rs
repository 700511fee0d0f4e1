//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};

/// Minimum accepted length of the token signing secret, in bytes
const MIN_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime: one year
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 366;

/// Where account rows live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL (required for the postgres backend)
    pub database_url: Option<String>,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    pub storage_backend: StorageBackend,

    /// HS256 signing secret for bearer tokens
    pub jwt_secret: SecretString,

    /// Bearer token lifetime (`TOKEN_TTL_HOURS`)
    pub token_ttl: Duration,

    /// Points granted to every new account
    pub starter_points: i64,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_backend = match lookup("STORAGE_BACKEND").as_deref() {
            None | Some("postgres") => StorageBackend::Postgres,
            Some("memory") => StorageBackend::Memory,
            Some(_) => return Err(ConfigError::InvalidValue("STORAGE_BACKEND")),
        };

        let database_url = lookup("DATABASE_URL");
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingEnv("DATABASE_URL"));
        }

        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?;

        let jwt_secret = lookup("JWT_SECRET")
            .map(SecretString::from)
            .ok_or(ConfigError::MissingEnv("JWT_SECRET"))?;
        if jwt_secret.expose_secret().len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakSecret(MIN_SECRET_LEN));
        }

        let token_ttl_hours: i64 = parse_or(&lookup, "TOKEN_TTL_HOURS", 72)?;
        let token_ttl = Some(token_ttl_hours)
            .filter(|hours| (1..=MAX_TOKEN_TTL_HOURS).contains(hours))
            .and_then(Duration::try_hours)
            .ok_or(ConfigError::InvalidValue("TOKEN_TTL_HOURS"))?;

        let starter_points: i64 = parse_or(&lookup, "STARTER_POINTS", 100)?;
        if starter_points < 0 {
            return Err(ConfigError::InvalidValue("STARTER_POINTS"));
        }

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or(&lookup, "PORT", 3000)?;
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(_) => return Err(ConfigError::InvalidValue("LOG_FORMAT")),
        };

        Ok(Self {
            database_url,
            database_max_connections,
            storage_backend,
            jwt_secret,
            token_ttl,
            starter_points,
            host,
            port,
            environment,
            log_format,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue(key)),
        None => Ok(default),
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),

    #[error("JWT_SECRET must be at least {0} bytes")]
    WeakSecret(usize),
}
