//! ZeeCloths Core - Shared types library.
//!
//! This crate provides the domain types shared by every ZeeCloths client:
//! - `cart` - The cart state container used by all presentation layers
//! - `cli` - Command-line driver for a locally persisted cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage, no HTTP clients.
//! Product records arrive from the catalog service and are handed to the cart
//! unchanged, so they live here where every layer can name them.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, variants and catalog products

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
