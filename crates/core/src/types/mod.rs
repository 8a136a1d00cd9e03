//! Core types for ZeeCloths.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod product;
pub mod variant;

pub use id::*;
pub use price::{CurrencyCode, Price, PriceError};
pub use product::Product;
pub use variant::Variant;
