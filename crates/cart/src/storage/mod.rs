//! Durable local storage for carts.
//!
//! A cart is stored as a single record holding its line-item sequence, under
//! one key per session or per signed-in user. The store reads the record once
//! when it opens and rewrites it after every mutation.
//!
//! # Backends
//!
//! - [`MemoryStorage`] - In-process map, for tests and ephemeral sessions
//! - [`FileStorage`] - One JSON file per key in a local directory

use core::fmt;

use zeecloths_core::UserId;

use crate::error::StorageError;
use crate::line_item::LineItem;

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Maximum length of a storage key.
const MAX_KEY_LENGTH: usize = 128;

/// Key under which one cart record is stored.
///
/// Keys are restricted to ASCII letters, digits, `-` and `_` so every
/// backend can use them verbatim (as a file name, for example).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// Key for an anonymous browsing session.
    pub const SESSION: &'static str = "cart";

    /// Create a key after validating its characters.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] if the key is empty, too long, or
    /// contains characters outside `[A-Za-z0-9_-]`.
    pub fn new(key: impl Into<String>) -> Result<Self, StorageError> {
        let key = key.into();
        let valid = !key.is_empty()
            && key.len() <= MAX_KEY_LENGTH
            && key
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if valid {
            Ok(Self(key))
        } else {
            Err(StorageError::InvalidKey(key))
        }
    }

    /// The key used by an anonymous session.
    #[must_use]
    pub fn session() -> Self {
        Self(Self::SESSION.to_owned())
    }

    /// The key holding a signed-in user's cart.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidKey`] if the user ID cannot be embedded
    /// in a key.
    pub fn for_user(user_id: &UserId) -> Result<Self, StorageError> {
        Self::new(format!("{}-user-{user_id}", Self::SESSION))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A key-value store holding serialized carts.
pub trait CartStorage {
    /// Read the cart stored under `key`, or `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the record exists but cannot be read or
    /// decoded.
    fn load(&self, key: &StorageKey) -> Result<Option<Vec<LineItem>>, StorageError>;

    /// Replace the cart stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the record cannot be written.
    fn save(&self, key: &StorageKey, items: &[LineItem]) -> Result<(), StorageError>;

    /// Delete the cart stored under `key`. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the record exists but cannot be deleted.
    fn remove(&self, key: &StorageKey) -> Result<(), StorageError>;
}

impl<T: CartStorage + ?Sized> CartStorage for &T {
    fn load(&self, key: &StorageKey) -> Result<Option<Vec<LineItem>>, StorageError> {
        (**self).load(key)
    }

    fn save(&self, key: &StorageKey, items: &[LineItem]) -> Result<(), StorageError> {
        (**self).save(key, items)
    }

    fn remove(&self, key: &StorageKey) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<T: CartStorage + ?Sized> CartStorage for Box<T> {
    fn load(&self, key: &StorageKey) -> Result<Option<Vec<LineItem>>, StorageError> {
        (**self).load(key)
    }

    fn save(&self, key: &StorageKey, items: &[LineItem]) -> Result<(), StorageError> {
        (**self).save(key, items)
    }

    fn remove(&self, key: &StorageKey) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}
