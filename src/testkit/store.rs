//! In-memory [`OrderStore`] with failure injection.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::id::OrderId;
use crate::domain::order::Order;
use crate::error::{Result, StoreError};
use crate::port::outbound::store::OrderStore;

/// Orders kept in insertion order, with the same version check as SQLite.
#[derive(Default)]
pub struct MemoryStore {
    orders: Mutex<Vec<Order>>,
    failing_fetches: AtomicUsize,
    fetches: AtomicUsize,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orders(orders: Vec<Order>) -> Self {
        Self {
            orders: Mutex::new(orders),
            ..Self::default()
        }
    }

    /// Make the next `count` calls to `find_active` fail.
    pub fn fail_next_fetches(&self, count: usize) {
        self.failing_fetches.store(count, Ordering::SeqCst);
    }

    /// Replace a stored order as-is, bypassing the version check.
    pub fn put(&self, order: Order) {
        let mut orders = self.orders.lock();
        match orders.iter_mut().find(|o| o.id == order.id) {
            Some(slot) => *slot = order,
            None => orders.push(order),
        }
    }

    /// Synchronous lookup for assertions.
    pub fn get(&self, id: &str) -> Option<Order> {
        self.orders
            .lock()
            .iter()
            .find(|o| o.id.as_str() == id)
            .cloned()
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn find_active(&self) -> Result<Vec<Order>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let failing = self.failing_fetches.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_fetches.store(failing - 1, Ordering::SeqCst);
            return Err(StoreError::Unavailable("injected fetch failure".into()).into());
        }
        Ok(self
            .orders
            .lock()
            .iter()
            .filter(|o| o.is_active())
            .cloned()
            .collect())
    }

    async fn find(&self, id: &OrderId) -> Result<Option<Order>> {
        Ok(self.orders.lock().iter().find(|o| &o.id == id).cloned())
    }

    async fn save(&self, order: &Order) -> Result<Order> {
        let mut orders = self.orders.lock();
        let slot = orders
            .iter_mut()
            .find(|o| o.id == order.id)
            .ok_or_else(|| StoreError::NotFound(order.id.to_string()))?;
        if slot.version() != order.version() {
            return Err(StoreError::VersionConflict {
                order_id: order.id.to_string(),
                expected: order.version(),
            }
            .into());
        }
        let mut saved = order.clone();
        saved.increment_version();
        *slot = saved.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(saved)
    }

    async fn insert(&self, order: &Order) -> Result<()> {
        let mut orders = self.orders.lock();
        if orders.iter().any(|o| o.id == order.id) {
            return Err(StoreError::Database(format!("duplicate order {}", order.id)).into());
        }
        orders.push(order.clone());
        Ok(())
    }
}
