//! Cart error types.
//!
//! Errors are local to the call that produced them; none is fatal to the
//! session. Storage failures on write are logged and recorded on the store
//! rather than returned, because the in-memory cart stays authoritative.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The caller referenced a line item position that no longer exists,
    /// typically from a stale view. Callers should refresh and retry.
    #[error("line item index {index} out of range (cart has {len} items)")]
    InvalidIndex { index: usize, len: usize },
}

/// Errors from a cart storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stored record could not be encoded or decoded.
    #[error("Serialization error for key {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The storage key contains characters the backend cannot store.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// The backend refused the operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors from [`CartStore::checkout`](crate::CartStore::checkout).
#[derive(Debug, Error)]
pub enum CheckoutError<E> {
    /// There is nothing to order.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// The order service rejected or failed the submission. The cart is left
    /// untouched so the customer can retry.
    #[error("order submission failed: {0}")]
    Submission(E),
}
