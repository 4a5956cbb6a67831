//! Per-order claim registry.
//!
//! A worker must hold an order's claim to evaluate it. Claims are released
//! when the [`ClaimGuard`] drops, so a retiring worker finishing its
//! in-flight tick and its replacement never evaluate the same order at once.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::id::OrderId;

/// Concurrent map of order id to the worker holding it.
#[derive(Clone, Default)]
pub struct OrderClaims {
    held: Arc<DashMap<OrderId, u64>>,
}

impl OrderClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `order` for `holder`. `None` when someone else holds it.
    #[must_use]
    pub fn try_claim(&self, order: &OrderId, holder: u64) -> Option<ClaimGuard> {
        match self.held.entry(order.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(holder);
                Some(ClaimGuard {
                    held: Arc::clone(&self.held),
                    order: order.clone(),
                    holder,
                })
            }
        }
    }

    /// Current holder of `order`, if any.
    #[must_use]
    pub fn holder(&self, order: &OrderId) -> Option<u64> {
        self.held.get(order).map(|entry| *entry.value())
    }

    /// Number of orders currently claimed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.held.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

/// Releases its claim on drop.
pub struct ClaimGuard {
    held: Arc<DashMap<OrderId, u64>>,
    order: OrderId,
    holder: u64,
}

impl ClaimGuard {
    #[must_use]
    pub fn order(&self) -> &OrderId {
        &self.order
    }
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        let holder = self.holder;
        self.held.remove_if(&self.order, |_, current| *current == holder);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn second_claim_is_refused_until_release() {
        let claims = OrderClaims::new();
        let id = OrderId::new("o-1");

        let guard = claims.try_claim(&id, 1).expect("first claim");
        assert!(claims.try_claim(&id, 2).is_none());
        assert_eq!(claims.holder(&id), Some(1));

        drop(guard);
        assert!(claims.is_empty());
        assert!(claims.try_claim(&id, 2).is_some());
    }

    #[test]
    fn claims_are_per_order() {
        let claims = OrderClaims::new();
        let _a = claims.try_claim(&OrderId::new("a"), 1).unwrap();
        let _b = claims.try_claim(&OrderId::new("b"), 1).unwrap();
        assert_eq!(claims.len(), 2);
    }

    #[test]
    fn concurrent_claims_have_exactly_one_winner() {
        let claims = OrderClaims::new();
        let id = OrderId::new("contended");
        let winners = Arc::new(AtomicUsize::new(0));
        let start = Arc::new(std::sync::Barrier::new(8));
        let tried = Arc::new(std::sync::Barrier::new(8));

        let handles: Vec<_> = (0..8u64)
            .map(|holder| {
                let claims = claims.clone();
                let id = id.clone();
                let winners = Arc::clone(&winners);
                let start = Arc::clone(&start);
                let tried = Arc::clone(&tried);
                std::thread::spawn(move || {
                    start.wait();
                    let guard = claims.try_claim(&id, holder);
                    if guard.is_some() {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                    // Hold until every thread has tried.
                    tried.wait();
                    drop(guard);
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("claim thread");
        }
        assert_eq!(winners.load(Ordering::SeqCst), 1);
        assert!(claims.is_empty());
    }
}
