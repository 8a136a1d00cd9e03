//! Change notification for cart consumers.
//!
//! Presentation layers subscribe to a [`CartStore`](crate::CartStore) and
//! re-render when notified. Observers run synchronously, in subscription
//! order, after the mutation has been applied and persisted.

use zeecloths_core::Price;

use crate::line_item::{LineItem, item_count_of};

/// What changed in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartEvent {
    /// A product was added; `merged` is true when it increased the quantity
    /// of an existing line item instead of appending a new one.
    ItemAdded { index: usize, merged: bool },
    /// The line item at `index` was removed.
    ItemRemoved { index: usize },
    /// The line item at `index` now has `quantity` units.
    QuantityUpdated { index: usize, quantity: u32 },
    /// Every line item was removed.
    Cleared,
}

/// Read-only view of the cart handed to observers.
#[derive(Debug, Clone, Copy)]
pub struct CartView<'a> {
    items: &'a [LineItem],
    subtotal: Price,
}

impl<'a> CartView<'a> {
    pub(crate) const fn new(items: &'a [LineItem], subtotal: Price) -> Self {
        Self { items, subtotal }
    }

    #[must_use]
    pub const fn items(&self) -> &'a [LineItem] {
        self.items
    }

    #[must_use]
    pub const fn subtotal(&self) -> Price {
        self.subtotal
    }

    #[must_use]
    pub fn item_count(&self) -> u64 {
        item_count_of(self.items)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Receives a notification after every cart mutation.
pub trait CartObserver {
    fn on_change(&self, event: &CartEvent, cart: &CartView<'_>);
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

/// Adapts a closure into a [`CartObserver`].
pub(crate) struct FnObserver<F>(pub(crate) F);

impl<F> CartObserver for FnObserver<F>
where
    F: Fn(&CartEvent, &CartView<'_>),
{
    fn on_change(&self, event: &CartEvent, cart: &CartView<'_>) {
        (self.0)(event, cart);
    }
}
