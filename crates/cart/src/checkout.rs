//! Checkout snapshots and order requests.
//!
//! Checkout reads the cart, hands an order request to the order service and
//! clears the cart once the service accepts it. The request is built from an
//! owned [`CartSnapshot`], so mutating the cart while a submission is in
//! flight cannot change what was submitted.
//!
//! Unit prices are the ones captured when each item was added. They are not
//! re-checked against the catalog here; the order service owns that decision.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use zeecloths_core::{Price, ProductId, UserId};

use crate::line_item::{LineItem, item_count_of};

/// Payment method sent when the caller does not choose one.
pub const DEFAULT_PAYMENT_METHOD: &str = "card";

/// An owned copy of the cart at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSnapshot {
    items: Vec<LineItem>,
    subtotal: Price,
}

impl CartSnapshot {
    pub(crate) const fn new(items: Vec<LineItem>, subtotal: Price) -> Self {
        Self { items, subtotal }
    }

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub const fn subtotal(&self) -> Price {
        self.subtotal
    }

    #[must_use]
    pub fn item_count(&self) -> u64 {
        item_count_of(&self.items)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Build the order-service payload for this snapshot.
    #[must_use]
    pub fn order_request(&self, details: CheckoutDetails) -> OrderRequest {
        OrderRequest {
            user_id: details.user_id,
            items: self.items.iter().map(OrderLine::from).collect(),
            total_amount: self.subtotal.amount(),
            shipping_address: details.shipping_address,
            payment_method: details.payment_method,
        }
    }
}

/// Order fields supplied by the caller rather than the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDetails {
    pub user_id: Option<UserId>,
    pub shipping_address: Option<String>,
    pub payment_method: String,
}

impl Default for CheckoutDetails {
    fn default() -> Self {
        Self {
            user_id: None,
            shipping_address: None,
            payment_method: DEFAULT_PAYMENT_METHOD.to_owned(),
        }
    }
}

/// Payload accepted by the order service's create-order endpoint.
///
/// Field names are part of the contract with that service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub items: Vec<OrderLine>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    pub payment_method: String,
}

/// One line of an [`OrderRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl From<&LineItem> for OrderLine {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            quantity: item.quantity.get(),
            price: item.unit_price.amount(),
            size: item.variant.size.clone(),
            color: item.variant.color.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroU32;

    use chrono::Utc;
    use serde_json::json;
    use zeecloths_core::{Product, Variant};

    use super::*;
    use crate::line_item::subtotal_of;

    fn snapshot() -> CartSnapshot {
        let items = vec![
            LineItem::from_product(
                &Product::new("P1", "Oversized Tee", Price::from(100)),
                Variant::new("M", "Black"),
                NonZeroU32::new(3).unwrap(),
                Utc::now(),
            ),
            LineItem::from_product(
                &Product::new("P7", "Tote Bag", Price::from_minor(4_950).unwrap()),
                Variant::none(),
                NonZeroU32::new(1).unwrap(),
                Utc::now(),
            ),
        ];
        let subtotal = subtotal_of(&items);
        CartSnapshot::new(items, subtotal)
    }

    #[test]
    fn test_order_request_wire_format() {
        let request = snapshot().order_request(CheckoutDetails {
            user_id: Some(UserId::new("u-9")),
            shipping_address: Some("12 MG Road, Pune".to_string()),
            ..CheckoutDetails::default()
        });

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "userId": "u-9",
                "items": [
                    { "productId": "P1", "quantity": 3, "price": 100.0, "size": "M", "color": "Black" },
                    { "productId": "P7", "quantity": 1, "price": 49.5 }
                ],
                "totalAmount": 349.5,
                "shippingAddress": "12 MG Road, Pune",
                "paymentMethod": "card"
            })
        );
    }

    #[test]
    fn test_default_details_omit_optional_fields() {
        let value = serde_json::to_value(snapshot().order_request(CheckoutDetails::default())).unwrap();
        assert!(value.get("userId").is_none());
        assert!(value.get("shippingAddress").is_none());
        assert_eq!(value["paymentMethod"], "card");
    }

    #[test]
    fn test_snapshot_totals() {
        let snapshot = snapshot();
        assert_eq!(snapshot.item_count(), 4);
        assert_eq!(snapshot.subtotal(), "349.50".parse().unwrap());
        assert!(!snapshot.is_empty());
    }
}
