//! Per-order evaluation: claim, price, trigger, execute, classify.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use super::claims::OrderClaims;
use super::classify::{classify, FailureOutcome};
use super::execution::{ExecutionEngine, PendingResolution};
use super::pricing::PriceEvaluator;
use crate::domain::order::{Order, OrderStatus};
use crate::domain::trigger::{Decision, TriggerPolicy};
use crate::error::Result;
use crate::port::outbound::keys::KeyResolver;
use crate::port::outbound::store::OrderStore;

/// What happened to one order in one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    /// Priced but outside the trigger window.
    Held { change: Decimal },
    /// Executed and saved; carries the stored order.
    Filled(Box<Order>),
    /// Another worker holds the claim.
    Contended,
    /// The worker's copy is no longer active.
    Inactive,
    /// The stored order changed since the snapshot; carries the fresh copy.
    Stale(Option<Box<Order>>),
    /// A submitted swap of this order has no receipt yet.
    AwaitingReceipt,
    /// Evaluation failed; the order stays active.
    Failed(FailureOutcome),
}

/// Evaluates single orders. Shared by every worker of every generation.
pub struct OrderEvaluator {
    pricing: PriceEvaluator,
    policy: TriggerPolicy,
    engine: ExecutionEngine,
    keys: Arc<dyn KeyResolver>,
    store: Arc<dyn OrderStore>,
    claims: OrderClaims,
}

impl OrderEvaluator {
    pub fn new(
        pricing: PriceEvaluator,
        policy: TriggerPolicy,
        engine: ExecutionEngine,
        keys: Arc<dyn KeyResolver>,
        store: Arc<dyn OrderStore>,
        claims: OrderClaims,
    ) -> Self {
        Self {
            pricing,
            policy,
            engine,
            keys,
            store,
            claims,
        }
    }

    #[must_use]
    pub fn claims(&self) -> &OrderClaims {
        &self.claims
    }

    /// Evaluate `order` on behalf of `worker`. Never fails: errors are
    /// classified, logged and reported as [`OrderOutcome::Failed`].
    pub async fn evaluate(&self, worker: u64, order: &Order) -> OrderOutcome {
        if !order.is_active() {
            return OrderOutcome::Inactive;
        }
        let Some(_claim) = self.claims.try_claim(&order.id, worker) else {
            debug!(order_id = %order.id, worker_id = worker, "Order claimed elsewhere, skipping");
            return OrderOutcome::Contended;
        };

        match self.evaluate_claimed(order).await {
            Ok(outcome) => outcome,
            Err(err) => {
                let outcome = classify(&err);
                if err.is_version_conflict() {
                    error!(
                        order_id = %order.id,
                        worker_id = worker,
                        error = %err,
                        "Lost save race after execution, stored order kept"
                    );
                } else if outcome == FailureOutcome::Unclassified {
                    warn!(
                        order_id = %order.id,
                        worker_id = worker,
                        outcome = %outcome,
                        error = %err,
                        "Order evaluation failed"
                    );
                } else {
                    info!(
                        order_id = %order.id,
                        worker_id = worker,
                        outcome = %outcome,
                        error = %err,
                        "Order skipped"
                    );
                }
                OrderOutcome::Failed(outcome)
            }
        }
    }

    async fn evaluate_claimed(&self, order: &Order) -> Result<OrderOutcome> {
        if order.pending_trade().is_some() {
            return self.resolve_pending(order).await;
        }

        let priced = self.pricing.price(order).await?;
        let decision = self.policy.decide(order.kind, priced.change);
        debug!(
            order_id = %order.id,
            kind = %order.kind,
            change = %priced.change,
            decision = ?decision,
            "Order priced"
        );
        if decision == Decision::Hold {
            return Ok(OrderOutcome::Held {
                change: priced.change,
            });
        }

        let fresh = self.store.find(&order.id).await?;
        let current = match fresh {
            Some(current)
                if current.status() == OrderStatus::Active
                    && current.version() == order.version() =>
            {
                current
            }
            other => {
                info!(
                    order_id = %order.id,
                    status = ?other.as_ref().map(Order::status),
                    "Order changed since snapshot, not executing"
                );
                return Ok(OrderOutcome::Stale(other.map(Box::new)));
            }
        };

        let key = self.keys.resolve(&current.wallet).await?;
        info!(
            order_id = %current.id,
            kind = %current.kind,
            change = %priced.change,
            "Order triggered"
        );
        let saved = self.engine.execute(&current, &key, &priced).await?;
        info!(
            order_id = %saved.id,
            tx_hash = saved.trades().last().map(|t| t.hash.as_str()).unwrap_or_default(),
            "Order filled"
        );
        Ok(OrderOutcome::Filled(Box::new(saved)))
    }

    async fn resolve_pending(&self, order: &Order) -> Result<OrderOutcome> {
        match self.engine.resolve_pending(order).await? {
            PendingResolution::Awaiting => {
                debug!(order_id = %order.id, "Swap receipt still pending");
                Ok(OrderOutcome::AwaitingReceipt)
            }
            PendingResolution::Filled(saved) => {
                info!(
                    order_id = %saved.id,
                    tx_hash = saved.trades().last().map(|t| t.hash.as_str()).unwrap_or_default(),
                    "Pending swap confirmed, order filled"
                );
                Ok(OrderOutcome::Filled(Box::new(saved)))
            }
            PendingResolution::Reverted(saved) => {
                warn!(order_id = %saved.id, "Pending swap reverted, order released");
                Ok(OrderOutcome::Stale(Some(Box::new(saved))))
            }
        }
    }
}
