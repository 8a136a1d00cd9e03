//! CLI error type.

use thiserror::Error;
use zeecloths_cart::{CartError, CheckoutError, StorageError};

use crate::config::ConfigError;

/// Errors surfaced by `zee-cart` commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Cart(#[from] CartError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The mutation was applied but could not be saved, so it will be lost
    /// when the process exits.
    #[error("Cart change was not saved: {0}")]
    NotPersisted(String),

    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Failed to write order: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode order: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<CheckoutError<Self>> for CliError {
    fn from(err: CheckoutError<Self>) -> Self {
        match err {
            CheckoutError::EmptyCart => Self::EmptyCart,
            CheckoutError::Submission(e) => e,
        }
    }
}

/// Result type alias for `CliError`.
pub type Result<T> = std::result::Result<T, CliError>;
