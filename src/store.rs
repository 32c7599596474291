//! Shared, observable cart state.
//!
//! The cart is the one mutable resource read and written across components
//! (header badge, product listings, checkout), so it lives behind a lock and
//! publishes whole-cart snapshots: subscribers always observe a complete
//! state, never a torn update.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rust_decimal::Decimal;
use tokio::sync::watch;

use crate::domain::cart::{Cart, ProductSnapshot};

#[derive(Clone)]
pub struct CartStore {
    inner: Arc<Inner>,
}

struct Inner {
    cart: RwLock<Cart>,
    tx: watch::Sender<Cart>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Cart::new());
        Self {
            inner: Arc::new(Inner {
                cart: RwLock::new(Cart::new()),
                tx,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Cart> {
        match self.inner.cart.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Cart> {
        match self.inner.cart.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn mutate(&self, f: impl FnOnce(&mut Cart)) {
        let snapshot = {
            let mut cart = self.write();
            f(&mut cart);
            cart.clone()
        };
        self.inner.tx.send_replace(snapshot);
    }

    pub fn add_item(&self, product: ProductSnapshot) {
        self.mutate(|cart| cart.add_item(product));
    }

    pub fn remove_item(&self, product_id: &str) {
        self.mutate(|cart| cart.remove_item(product_id));
    }

    pub fn set_quantity(&self, product_id: &str, quantity: u32) {
        self.mutate(|cart| cart.set_quantity(product_id, quantity));
    }

    pub fn clear(&self) {
        self.mutate(Cart::clear);
    }

    pub fn snapshot(&self) -> Cart {
        self.read().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn unit_count(&self) -> u32 {
        self.read().unit_count()
    }

    pub fn total_price(&self) -> Decimal {
        self.read().total_price()
    }

    /// Watch whole-cart snapshots; the receiver starts at the current state.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.inner.tx.subscribe()
    }
}
