//! Cart line items.

use std::num::NonZeroU32;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeecloths_core::{Price, Product, ProductId, Variant};

/// One row in the cart: a product, a variant and a quantity.
///
/// Display fields (`name`, `unit_price`, `image_ref`) are copied from the
/// catalog record when the item is first added and are never refreshed, so
/// the price is the one the customer saw at add time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    #[serde(flatten)]
    pub variant: Variant,
    pub quantity: NonZeroU32,
    pub added_at: DateTime<Utc>,
}

impl LineItem {
    /// Snapshot a catalog product into a new line item.
    #[must_use]
    pub fn from_product(
        product: &Product,
        variant: Variant,
        quantity: NonZeroU32,
        added_at: DateTime<Utc>,
    ) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            image_ref: product.image_url.clone(),
            variant,
            quantity,
            added_at,
        }
    }

    /// Whether an addition of `product_id` in `variant` merges into this row.
    #[must_use]
    pub fn matches(&self, product_id: &ProductId, variant: &Variant) -> bool {
        self.product_id == *product_id && self.variant == *variant
    }

    /// Increase the quantity, saturating at `u32::MAX`.
    pub fn add_quantity(&mut self, quantity: NonZeroU32) {
        self.quantity = self.quantity.saturating_add(quantity.get());
    }

    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity.get())
    }
}

/// Sum of line totals.
#[must_use]
pub fn subtotal_of(items: &[LineItem]) -> Price {
    items.iter().map(LineItem::line_total).sum()
}

/// Sum of quantities.
#[must_use]
pub fn item_count_of(items: &[LineItem]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity.get())).sum()
}
