//! Directory configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `DATABASE_URL` - `SQLite` connection string (default: `sqlite://electronet.db`)
//! - `SMTP_HOST` - SMTP relay hostname; debt notices cannot be sent when unset
//! - `SMTP_PORT` - SMTP relay port (default: 587)
//! - `SMTP_USERNAME` - SMTP authentication username (required with `SMTP_HOST`)
//! - `SMTP_PASSWORD` - SMTP authentication password (required with `SMTP_HOST`)
//! - `SMTP_FROM` - Sender address (default: no-reply@example.com)
//! - `NOTIFY_MAX_RETRIES` - Retries after a failed notification run (default: 3)
//! - `NOTIFY_RUN_TIMEOUT_SECS` - Wall-clock budget per run attempt (default: 1800)
//! - `LOG_JSON` - Emit JSON logs when set to `1` or `true`

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::services::notifications::RetryPolicy;

/// Fallback sender when `SMTP_FROM` is unset.
const DEFAULT_FROM_ADDRESS: &str = "no-reply@example.com";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Directory application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// `SQLite` database connection URL.
    pub database_url: String,
    /// SMTP relay configuration; `None` when `SMTP_HOST` is unset.
    pub smtp: Option<SmtpConfig>,
    /// Retry policy for the debt notification job.
    pub retry: RetryPolicy,
    /// Emit JSON logs instead of human-readable text.
    pub log_json: bool,
}

/// SMTP relay configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct SmtpConfig {
    /// SMTP server hostname.
    pub host: String,
    /// SMTP server port.
    pub port: u16,
    /// SMTP authentication username.
    pub username: String,
    /// SMTP authentication password.
    pub password: SecretString,
    /// Sender address (From header).
    pub from_address: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a set variable fails to parse, or when an SMTP
    /// host is configured without credentials.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_env_or_default("DATABASE_URL", "sqlite://electronet.db");
        let smtp = SmtpConfig::from_env()?;

        let max_retries = parse_env_or("NOTIFY_MAX_RETRIES", 3_u32)?;
        let run_timeout_secs = parse_env_or("NOTIFY_RUN_TIMEOUT_SECS", 1800_u64)?;
        let retry = RetryPolicy {
            max_retries,
            run_timeout: Duration::from_secs(run_timeout_secs),
            ..RetryPolicy::default()
        };

        let log_json = get_optional_env("LOG_JSON")
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));

        Ok(Self {
            database_url,
            smtp,
            retry,
            log_json,
        })
    }
}

impl SmtpConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(host) = get_optional_env("SMTP_HOST") else {
            return Ok(None);
        };

        Ok(Some(Self {
            host,
            port: parse_env_or("SMTP_PORT", 587_u16)?,
            username: get_required_env("SMTP_USERNAME")?,
            password: get_required_secret("SMTP_PASSWORD")?,
            from_address: get_env_or_default("SMTP_FROM", DEFAULT_FROM_ADDRESS),
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to a default when unset.
fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
