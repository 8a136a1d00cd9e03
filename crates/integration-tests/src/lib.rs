//! Integration tests for the ZeeCloths cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p zeecloths-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - Multi-step cart behaviour through the public API
//! - `file_persistence` - Carts surviving process restarts via `FileStorage`
//!
//! This library holds the fixtures shared by those test files.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::num::NonZeroU32;

use zeecloths_core::{Price, Product};

/// A catalog product priced in whole rupees.
#[must_use]
pub fn product(id: &str, name: &str, price: u32) -> Product {
    Product::new(id, name, Price::from(price)).with_image(format!("/static/images/{id}.jpg"))
}

/// A non-zero quantity.
///
/// # Panics
///
/// Panics if `n` is zero.
#[must_use]
pub fn qty(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap_or_else(|| panic!("quantity must be non-zero"))
}
