//! ZeeCloths Cart - Shopping-cart state container.
//!
//! One cart implementation shared by every ZeeCloths client (mobile, native
//! and browser front ends), instead of one copy per presentation layer.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the line items, recomputes the subtotal and mirrors
//!   the cart to a [`CartStorage`] backend after every mutation
//! - Presentation layers subscribe as [`CartObserver`]s and re-render on
//!   each [`CartEvent`]
//! - Checkout builds an [`OrderRequest`] from an owned [`CartSnapshot`] and
//!   clears the cart once the order service accepts it
//!
//! The store is single-threaded and synchronous. Create one per session and
//! inject it where needed; there is no global instance.
//!
//! # Example
//!
//! ```rust
//! use std::num::NonZeroU32;
//!
//! use zeecloths_cart::{CartStore, MemoryStorage, StorageKey};
//! use zeecloths_core::{Price, Product, Variant};
//!
//! let mut cart = CartStore::open(MemoryStorage::new(), StorageKey::session());
//! let tee = Product::new("P1", "Oversized Tee", Price::from(100));
//!
//! cart.add_item(&tee, Variant::new("M", "Black"), NonZeroU32::new(2).unwrap());
//! assert_eq!(cart.subtotal(), Price::from(200));
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod error;
pub mod line_item;
pub mod observer;
pub mod storage;
pub mod store;

pub use checkout::{CartSnapshot, CheckoutDetails, OrderLine, OrderRequest};
pub use error::{CartError, CheckoutError, StorageError};
pub use line_item::LineItem;
pub use observer::{CartEvent, CartObserver, CartView, SubscriptionId};
pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageKey};
pub use store::CartStore;
