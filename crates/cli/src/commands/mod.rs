//! `zee-cart` command implementations.
//!
//! Each invocation opens the cart from its file, applies one command and
//! exits. Commands write user-facing output to the writer they are given
//! (stdout in production) and log progress through `tracing`.

use std::path::PathBuf;

use tracing::info;
use zeecloths_cart::{CartEvent, CartObserver, CartStore, CartView, FileStorage, StorageKey};
use zeecloths_core::{CurrencyCode, UserId};

use crate::error::{CliError, Result};

pub mod cart;
pub mod checkout;

/// An opened cart plus the settings needed to present it.
pub struct Session {
    pub cart: CartStore<FileStorage>,
    pub currency: CurrencyCode,
}

impl Session {
    /// Open the session cart, or `user_id`'s cart, stored in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if `user_id` cannot be used as a storage key.
    pub fn open(dir: PathBuf, user_id: Option<&UserId>, currency: CurrencyCode) -> Result<Self> {
        let key = match user_id {
            Some(user_id) => StorageKey::for_user(user_id)?,
            None => StorageKey::session(),
        };

        let mut cart = CartStore::open(FileStorage::new(dir), key);
        cart.subscribe(LogObserver { currency });

        info!(
            key = %cart.key(),
            dir = %cart.storage().dir().display(),
            currency = currency.code(),
            items = cart.len(),
            subtotal = %currency.format(cart.subtotal()),
            "Cart opened"
        );
        Ok(Self { cart, currency })
    }

    /// Fail if the last mutation could not be written to disk.
    ///
    /// The store keeps going after a failed write, but a CLI process exits
    /// right after the command, so an unsaved change is a lost change.
    fn ensure_persisted(&self) -> Result<()> {
        match self.cart.last_persist_error() {
            Some(e) => Err(CliError::NotPersisted(e.to_string())),
            None => Ok(()),
        }
    }
}

/// Logs every cart change.
struct LogObserver {
    currency: CurrencyCode,
}

impl CartObserver for LogObserver {
    fn on_change(&self, event: &CartEvent, cart: &CartView<'_>) {
        info!(
            event = ?event,
            items = cart.items().len(),
            units = cart.item_count(),
            subtotal = %self.currency.format(cart.subtotal()),
            "Cart updated"
        );
    }
}
