//! Product variant selection.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The (size, color) pair distinguishing otherwise-identical products.
///
/// Either half may be absent for products sold without that option. Two
/// variants are equal only if both halves match exactly, including absence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Variant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Variant {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            size: None,
            color: None,
        }
    }

    /// A variant with both size and color selected.
    #[must_use]
    pub fn new(size: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            size: Some(size.into()),
            color: Some(color.into()),
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.size.is_none() && self.color.is_none()
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.size, &self.color) {
            (Some(size), Some(color)) => write!(f, "Size: {size} / Color: {color}"),
            (Some(size), None) => write!(f, "Size: {size}"),
            (None, Some(color)) => write!(f, "Color: {color}"),
            (None, None) => f.write_str("Default"),
        }
    }
}
