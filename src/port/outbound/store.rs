//! Persistence port for conditional orders.

use async_trait::async_trait;

use crate::domain::id::OrderId;
use crate::domain::order::Order;
use crate::error::{Result, StoreError};

/// Storage operations for orders.
///
/// Every order returned has its wallet joined. `save` is version checked:
/// it succeeds only when the stored version equals [`Order::version`], and
/// returns the order with the advanced version.
///
/// # Thread Safety
///
/// Shared by every worker and the quote broadcaster, so implementations must
/// be `Send + Sync`.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// All orders with status `active`, oldest first.
    async fn find_active(&self) -> Result<Vec<Order>>;

    /// Look up one order in any status.
    async fn find(&self, id: &OrderId) -> Result<Option<Order>>;

    /// Persist status and appended trades of an existing order.
    ///
    /// # Errors
    ///
    /// [`StoreError::VersionConflict`] when the stored version moved on; the
    /// stored row is left untouched.
    async fn save(&self, order: &Order) -> Result<Order>;

    /// Insert a new order together with its wallet.
    async fn insert(&self, order: &Order) -> Result<()>;

    /// Move an active order to `cancelled`.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] for unknown ids, a domain error when the order
    /// is no longer active, and any error from [`OrderStore::save`].
    async fn cancel(&self, id: &OrderId) -> Result<Order> {
        let mut order = self
            .find(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        order.cancel()?;
        self.save(&order).await
    }
}
