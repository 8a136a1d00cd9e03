//! The cart state container.
//!
//! [`CartStore`] owns the line items of one session's cart. Every mutation
//! runs to completion before returning:
//!
//! 1. the line items are updated,
//! 2. the subtotal is recomputed,
//! 3. the full cart is written to storage,
//! 4. every observer is notified.
//!
//! The in-memory cart is authoritative. A failed storage write is logged and
//! recorded (see [`CartStore::last_persist_error`]) but never undoes the
//! mutation.

use core::fmt;
use std::num::NonZeroU32;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};
use zeecloths_core::{Price, Product, Variant};

use crate::checkout::{CartSnapshot, CheckoutDetails, OrderRequest};
use crate::error::{CartError, CheckoutError, StorageError};
use crate::line_item::{LineItem, item_count_of, subtotal_of};
use crate::observer::{CartEvent, CartObserver, CartView, FnObserver, SubscriptionId};
use crate::storage::{CartStorage, StorageKey};

/// Shopping cart for one client session.
///
/// Construct one per session and pass it to the components that need it.
pub struct CartStore<S> {
    storage: S,
    key: StorageKey,
    items: Vec<LineItem>,
    subtotal: Price,
    observers: Vec<(SubscriptionId, Box<dyn CartObserver>)>,
    next_subscription: u64,
    last_persist_error: Option<StorageError>,
}

impl<S: CartStorage> CartStore<S> {
    /// Start an empty cart without reading storage.
    ///
    /// Nothing is written until the first mutation.
    pub fn new(storage: S, key: StorageKey) -> Self {
        Self::with_items(storage, key, Vec::new())
    }

    /// Open the cart stored under `key`.
    ///
    /// A missing record yields an empty cart. A record that cannot be read
    /// is logged and also yields an empty cart, since the session has to
    /// start either way; it is overwritten by the first mutation.
    pub fn open(storage: S, key: StorageKey) -> Self {
        let items = match storage.load(&key) {
            Ok(Some(items)) => {
                debug!(key = %key, items = items.len(), "Cart hydrated from storage");
                items
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to load stored cart, starting empty");
                Vec::new()
            }
        };
        Self::with_items(storage, key, items)
    }

    fn with_items(storage: S, key: StorageKey, items: Vec<LineItem>) -> Self {
        let subtotal = subtotal_of(&items);
        Self {
            storage,
            key,
            items,
            subtotal,
            observers: Vec::new(),
            next_subscription: 0,
            last_persist_error: None,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&LineItem> {
        self.items.get(index)
    }

    /// Number of line items (rows), not units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of `unit_price × quantity` over all line items.
    #[must_use]
    pub const fn subtotal(&self) -> Price {
        self.subtotal
    }

    /// Total number of units across all line items.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        item_count_of(&self.items)
    }

    #[must_use]
    pub const fn key(&self) -> &StorageKey {
        &self.key
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// The error from the most recent storage write, if it failed.
    ///
    /// Cleared by the next successful write.
    #[must_use]
    pub const fn last_persist_error(&self) -> Option<&StorageError> {
        self.last_persist_error.as_ref()
    }

    #[must_use]
    pub fn view(&self) -> CartView<'_> {
        CartView::new(&self.items, self.subtotal)
    }

    /// Owned copy of the current cart, unaffected by later mutations.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::new(self.items.clone(), self.subtotal)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units of `product` in `variant`.
    ///
    /// If a line item with the same product and variant exists its quantity
    /// is increased; otherwise a new line item is appended. Returns the index
    /// of the affected line item.
    #[instrument(skip(self, product, variant), fields(key = %self.key, product_id = %product.id))]
    pub fn add_item(&mut self, product: &Product, variant: Variant, quantity: NonZeroU32) -> usize {
        let existing = self
            .items
            .iter_mut()
            .enumerate()
            .find(|(_, item)| item.matches(&product.id, &variant));

        let (index, merged) = match existing {
            Some((index, item)) => {
                item.add_quantity(quantity);
                (index, true)
            }
            None => {
                self.items
                    .push(LineItem::from_product(product, variant, quantity, Utc::now()));
                (self.items.len() - 1, false)
            }
        };

        debug!(index, merged, quantity = quantity.get(), "Item added to cart");
        self.commit(CartEvent::ItemAdded { index, merged });
        index
    }

    /// Add a single unit of `product` in `variant`.
    pub fn add_one(&mut self, product: &Product, variant: Variant) -> usize {
        self.add_item(product, variant, NonZeroU32::MIN)
    }

    /// Remove the line item at `index` and return it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidIndex`] if `index` is out of range. The
    /// cart is left unchanged and observers are not notified.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn remove_item(&mut self, index: usize) -> Result<LineItem, CartError> {
        self.check_index(index)?;
        let removed = self.items.remove(index);

        debug!(product_id = %removed.product_id, "Item removed from cart");
        self.commit(CartEvent::ItemRemoved { index });
        Ok(removed)
    }

    /// Set the quantity of the line item at `index`.
    ///
    /// A quantity of zero or below removes the line item. Quantities above
    /// `u32::MAX` are clamped.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidIndex`] if `index` is out of range. The
    /// cart is left unchanged and observers are not notified.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn update_quantity(&mut self, index: usize, new_quantity: i64) -> Result<(), CartError> {
        if new_quantity <= 0 {
            return self.remove_item(index).map(|_| ());
        }

        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(CartError::InvalidIndex { index, len })?;

        let quantity = u32::try_from(new_quantity)
            .ok()
            .and_then(NonZeroU32::new)
            .unwrap_or(NonZeroU32::MAX);
        item.quantity = quantity;

        self.commit(CartEvent::QuantityUpdated {
            index,
            quantity: quantity.get(),
        });
        Ok(())
    }

    /// Remove every line item.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn clear(&mut self) {
        let removed = self.items.len();
        self.items.clear();

        debug!(removed, "Cart cleared");
        self.commit(CartEvent::Cleared);
    }

    /// Submit the cart as an order and clear it once the order is accepted.
    ///
    /// `submit` receives a request built from a snapshot of the cart. Its
    /// success value (typically the created order) is returned unchanged.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`] if there is nothing to order; `submit`
    ///   is not called.
    /// - [`CheckoutError::Submission`] if `submit` fails; the cart is kept.
    #[instrument(skip(self, details, submit), fields(key = %self.key, items = self.items.len()))]
    pub fn checkout<T, E, F>(
        &mut self,
        details: CheckoutDetails,
        submit: F,
    ) -> Result<T, CheckoutError<E>>
    where
        F: FnOnce(&OrderRequest) -> Result<T, E>,
        E: fmt::Display,
    {
        if self.is_empty() {
            warn!("Checkout attempted with an empty cart");
            return Err(CheckoutError::EmptyCart);
        }

        let request = self.snapshot().order_request(details);
        match submit(&request) {
            Ok(receipt) => {
                info!(total = %request.total_amount, "Order submitted, clearing cart");
                self.clear();
                Ok(receipt)
            }
            Err(e) => {
                warn!(error = %e, "Order submission failed, cart kept");
                Err(CheckoutError::Submission(e))
            }
        }
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Register an observer, notified after every mutation.
    pub fn subscribe<O>(&mut self, observer: O) -> SubscriptionId
    where
        O: CartObserver + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Register a closure as an observer.
    pub fn subscribe_fn<F>(&mut self, f: F) -> SubscriptionId
    where
        F: Fn(&CartEvent, &CartView<'_>) + 'static,
    {
        self.subscribe(FnObserver(f))
    }

    /// Remove an observer. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn check_index(&self, index: usize) -> Result<(), CartError> {
        let len = self.items.len();
        if index < len {
            Ok(())
        } else {
            Err(CartError::InvalidIndex { index, len })
        }
    }

    fn commit(&mut self, event: CartEvent) {
        self.subtotal = subtotal_of(&self.items);
        self.persist();

        let view = self.view();
        for (_, observer) in &self.observers {
            observer.on_change(&event, &view);
        }
    }

    /// Write the cart to storage. An empty cart is stored as no record.
    fn persist(&mut self) {
        let result = if self.items.is_empty() {
            self.storage.remove(&self.key)
        } else {
            self.storage.save(&self.key, &self.items)
        };
        match result {
            Ok(()) => self.last_persist_error = None,
            Err(e) => {
                error!(
                    key = %self.key,
                    error = %e,
                    "Failed to persist cart, in-memory state kept"
                );
                self.last_persist_error = Some(e);
            }
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("storage", &self.storage)
            .field("key", &self.key)
            .field("items", &self.items)
            .field("subtotal", &self.subtotal)
            .field("observers", &self.observers.len())
            .field("last_persist_error", &self.last_persist_error)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::storage::MemoryStorage;

    fn qty(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn tee() -> Product {
        Product::new("P1", "Oversized Tee", Price::from(100))
    }

    fn hoodie() -> Product {
        Product::new("P2", "Zip Hoodie", Price::from_minor(149_900).unwrap())
    }

    fn store() -> CartStore<MemoryStorage> {
        CartStore::new(MemoryStorage::new(), StorageKey::session())
    }

    fn assert_subtotal_consistent(cart: &CartStore<MemoryStorage>) {
        let expected: Price = cart.items().iter().map(LineItem::line_total).sum();
        assert_eq!(cart.subtotal(), expected);
    }

    fn recorder(cart: &mut CartStore<MemoryStorage>) -> Rc<RefCell<Vec<CartEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        cart.subscribe_fn(move |event, _| sink.borrow_mut().push(*event));
        events
    }

    #[test]
    fn test_same_variant_merges() {
        let mut cart = store();
        cart.add_item(&tee(), Variant::new("M", "Black"), qty(2));
        let index = cart.add_item(&tee(), Variant::new("M", "Black"), qty(3));

        assert_eq!(index, 0);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(0).unwrap().quantity.get(), 5);
        assert_eq!(cart.subtotal(), Price::from(500));
    }

    #[test]
    fn test_different_size_is_new_line() {
        let mut cart = store();
        cart.add_item(&tee(), Variant::new("M", "Black"), qty(1));
        let index = cart.add_item(&tee(), Variant::new("L", "Black"), qty(1));

        assert_eq!(index, 1);
        assert_eq!(cart.len(), 2);
        assert_subtotal_consistent(&cart);
    }

    #[test]
    fn test_merge_keeps_original_snapshot() {
        let mut cart = store();
        cart.add_one(&tee(), Variant::none());
        let repriced = Product::new("P1", "Oversized Tee (Sale)", Price::from(80));
        cart.add_one(&repriced, Variant::none());

        let item = cart.get(0).unwrap();
        assert_eq!(item.name, "Oversized Tee");
        assert_eq!(item.unit_price, Price::from(100));
        assert_eq!(cart.subtotal(), Price::from(200));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut cart = store();
        cart.add_one(&tee(), Variant::none());
        cart.add_one(&hoodie(), Variant::none());
        cart.add_one(&tee(), Variant::none());
        cart.update_quantity(0, 7).unwrap();

        let ids: Vec<_> = cart.items().iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(ids, ["P1", "P2"]);
    }

    #[test]
    fn test_update_quantity_sets_directly() {
        let mut cart = store();
        cart.add_item(&hoodie(), Variant::new("XL", "Grey"), qty(4));
        cart.update_quantity(0, 2).unwrap();

        assert_eq!(cart.get(0).unwrap().quantity.get(), 2);
        assert_eq!(cart.subtotal(), "2998.00".parse().unwrap());
    }

    #[test]
    fn test_update_quantity_non_positive_removes() {
        for value in [0, -1, i64::MIN] {
            let mut cart = store();
            cart.add_one(&tee(), Variant::none());
            cart.add_one(&hoodie(), Variant::none());

            cart.update_quantity(0, value).unwrap();

            assert_eq!(cart.len(), 1);
            assert_eq!(cart.get(0).unwrap().product_id.as_str(), "P2");
            assert_subtotal_consistent(&cart);
        }
    }

    #[test]
    fn test_update_quantity_clamps_large_values() {
        let mut cart = store();
        cart.add_one(&tee(), Variant::none());
        cart.update_quantity(0, i64::MAX).unwrap();
        assert_eq!(cart.get(0).unwrap().quantity, NonZeroU32::MAX);
    }

    #[test]
    fn test_invalid_index_errors_leave_cart_untouched() {
        let mut cart = store();
        cart.add_one(&tee(), Variant::none());
        let events = recorder(&mut cart);
        let writes = cart.storage().write_count();

        assert_eq!(
            cart.remove_item(3),
            Err(CartError::InvalidIndex { index: 3, len: 1 })
        );
        assert_eq!(
            cart.update_quantity(1, 2),
            Err(CartError::InvalidIndex { index: 1, len: 1 })
        );
        assert_eq!(
            cart.update_quantity(5, 0),
            Err(CartError::InvalidIndex { index: 5, len: 1 })
        );

        assert_eq!(cart.len(), 1);
        assert!(events.borrow().is_empty());
        assert_eq!(cart.storage().write_count(), writes);
    }

    #[test]
    fn test_remove_returns_item() {
        let mut cart = store();
        cart.add_item(&tee(), Variant::new("S", "White"), qty(2));
        let removed = cart.remove_item(0).unwrap();

        assert_eq!(removed.product_id.as_str(), "P1");
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Price::ZERO);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut cart = store();
        cart.add_item(&tee(), Variant::none(), qty(3));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Price::ZERO);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Price::ZERO);
    }

    #[test]
    fn test_every_mutation_persists() {
        let storage = MemoryStorage::new();
        let mut cart = CartStore::new(storage.clone(), StorageKey::session());

        cart.add_item(&tee(), Variant::none(), qty(2));
        assert_eq!(storage.get(&StorageKey::session()).unwrap().len(), 1);

        cart.update_quantity(0, 5).unwrap();
        let stored = storage.get(&StorageKey::session()).unwrap();
        assert_eq!(stored.first().unwrap().quantity.get(), 5);

        cart.clear();
        assert!(storage.get(&StorageKey::session()).is_none());
        assert_eq!(storage.write_count(), 3);
    }

    #[test]
    fn test_observers_run_after_write() {
        let storage = MemoryStorage::new();
        let mut cart = CartStore::new(storage.clone(), StorageKey::session());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let handle = storage.clone();
        cart.subscribe_fn(move |event, _| sink.borrow_mut().push((*event, handle.write_count())));

        cart.clear();
        cart.add_one(&tee(), Variant::none());

        assert_eq!(
            *seen.borrow(),
            vec![
                (CartEvent::Cleared, 1),
                (CartEvent::ItemAdded { index: 0, merged: false }, 2),
            ]
        );
        assert_eq!(storage.get(&StorageKey::session()).unwrap().len(), 1);
    }

    #[test]
    fn test_removing_last_item_drops_record() {
        let storage = MemoryStorage::new();
        let mut cart = CartStore::new(storage.clone(), StorageKey::session());
        cart.add_one(&tee(), Variant::none());
        assert!(storage.get(&StorageKey::session()).is_some());

        cart.remove_item(0).unwrap();
        assert!(storage.get(&StorageKey::session()).is_none());
        assert!(cart.last_persist_error().is_none());
    }

    #[test]
    fn test_persist_failure_keeps_mutation() {
        let storage = MemoryStorage::new();
        let mut cart = CartStore::new(storage.clone(), StorageKey::session());
        let events = recorder(&mut cart);

        storage.fail_writes(true);
        cart.add_item(&tee(), Variant::none(), qty(2));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.subtotal(), Price::from(200));
        assert!(matches!(
            cart.last_persist_error(),
            Some(StorageError::Unavailable(_))
        ));
        assert_eq!(events.borrow().len(), 1);
        assert!(storage.get(&StorageKey::session()).is_none());

        storage.fail_writes(false);
        cart.add_one(&tee(), Variant::none());
        assert!(cart.last_persist_error().is_none());
        let stored = storage.get(&StorageKey::session()).unwrap();
        assert_eq!(stored.first().unwrap().quantity.get(), 3);
    }

    #[test]
    fn test_open_hydrates_from_storage() {
        let storage = MemoryStorage::new();
        {
            let mut cart = CartStore::new(storage.clone(), StorageKey::session());
            cart.add_item(&tee(), Variant::new("M", "Black"), qty(2));
            cart.add_one(&hoodie(), Variant::none());
        }

        let cart = CartStore::open(storage, StorageKey::session());
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal(), "1699.00".parse().unwrap());
    }

    #[test]
    fn test_open_missing_record_is_empty() {
        let cart = CartStore::open(MemoryStorage::new(), StorageKey::session());
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Price::ZERO);
    }

    #[test]
    fn test_observers_see_event_and_fresh_totals() {
        let mut cart = store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        cart.subscribe_fn(move |event, view| {
            sink.borrow_mut()
                .push((*event, view.items().len(), view.subtotal(), view.item_count()));
        });

        cart.add_item(&tee(), Variant::none(), qty(2));
        cart.add_one(&tee(), Variant::none());
        cart.add_one(&hoodie(), Variant::none());
        cart.update_quantity(1, 2).unwrap();
        cart.remove_item(0).unwrap();
        cart.clear();

        let seen = seen.borrow();
        assert_eq!(
            *seen,
            vec![
                (CartEvent::ItemAdded { index: 0, merged: false }, 1, Price::from(200), 2),
                (CartEvent::ItemAdded { index: 0, merged: true }, 1, Price::from(300), 3),
                (CartEvent::ItemAdded { index: 1, merged: false }, 2, Price::from(1_799), 4),
                (CartEvent::QuantityUpdated { index: 1, quantity: 2 }, 2, Price::from(3_298), 5),
                (CartEvent::ItemRemoved { index: 0 }, 1, Price::from(2_998), 2),
                (CartEvent::Cleared, 0, Price::ZERO, 0),
            ]
        );
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut cart = store();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = cart.subscribe_fn(move |_, _| *sink.borrow_mut() += 1);

        cart.add_one(&tee(), Variant::none());
        assert!(cart.unsubscribe(id));
        assert!(!cart.unsubscribe(id));
        cart.add_one(&tee(), Variant::none());

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut cart = store();
        cart.add_item(&tee(), Variant::none(), qty(2));
        let snapshot = cart.snapshot();

        cart.update_quantity(0, 9).unwrap();
        cart.add_one(&hoodie(), Variant::none());

        assert_eq!(snapshot.items().len(), 1);
        assert_eq!(snapshot.items().first().unwrap().quantity.get(), 2);
        assert_eq!(snapshot.subtotal(), Price::from(200));
    }

    #[test]
    fn test_checkout_empty_cart_does_not_submit() {
        let mut cart = store();
        let mut called = false;
        let result: Result<(), CheckoutError<String>> =
            cart.checkout(CheckoutDetails::default(), |_| {
                called = true;
                Ok(())
            });

        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
        assert!(!called);
    }

    #[test]
    fn test_checkout_success_clears_cart() {
        let mut cart = store();
        cart.add_item(&tee(), Variant::new("M", "Black"), qty(2));

        let order_id = cart
            .checkout(CheckoutDetails::default(), |request| {
                assert_eq!(request.items.len(), 1);
                assert_eq!(request.total_amount, Price::from(200).amount());
                Ok::<_, String>("order-1".to_string())
            })
            .unwrap();

        assert_eq!(order_id, "order-1");
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Price::ZERO);
    }

    #[test]
    fn test_checkout_failure_keeps_cart() {
        let mut cart = store();
        cart.add_item(&tee(), Variant::none(), qty(2));

        let result: Result<(), _> = cart.checkout(CheckoutDetails::default(), |_| {
            Err("payment declined".to_string())
        });

        assert!(matches!(result, Err(CheckoutError::Submission(ref e)) if e == "payment declined"));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.subtotal(), Price::from(200));
    }
}
