//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `ZEECLOTHS_CART_DIR` - Directory holding cart records (default: .zeecloths)
//! - `ZEECLOTHS_CURRENCY` - Display currency code (default: INR)
//! - `ZEECLOTHS_USER_ID` - Signed-in user whose cart to use (default: session cart)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;

use thiserror::Error;
use zeecloths_core::{CurrencyCode, UserId};

const DEFAULT_CART_DIR: &str = ".zeecloths";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Directory for `FileStorage`
    pub cart_dir: PathBuf,
    /// Currency used to display prices
    pub currency: CurrencyCode,
    /// User whose cart is used; `None` selects the anonymous session cart
    pub user_id: Option<UserId>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let cart_dir = get("ZEECLOTHS_CART_DIR").map_or_else(|| PathBuf::from(DEFAULT_CART_DIR), PathBuf::from);
        let currency = match get("ZEECLOTHS_CURRENCY") {
            Some(code) => code
                .parse::<CurrencyCode>()
                .map_err(|e| ConfigError::InvalidEnvVar("ZEECLOTHS_CURRENCY".to_string(), e))?,
            None => CurrencyCode::default(),
        };
        let user_id = get("ZEECLOTHS_USER_ID").map(UserId::new);

        Ok(Self {
            cart_dir,
            currency,
            user_id,
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT"),
        })
    }
}
