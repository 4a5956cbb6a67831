//! Worker tasks that evaluate a fixed slice of orders on a fixed cadence.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::evaluation::{OrderEvaluator, OrderOutcome};
use crate::domain::order::Order;

/// Counts of per-order outcomes in one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub held: usize,
    pub filled: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// A worker before it is started.
pub struct WorkerTask {
    id: u64,
    generation: u64,
    slice: Vec<Order>,
    evaluator: Arc<OrderEvaluator>,
    interval: Duration,
}

impl WorkerTask {
    pub fn new(
        id: u64,
        generation: u64,
        slice: Vec<Order>,
        evaluator: Arc<OrderEvaluator>,
        interval: Duration,
    ) -> Self {
        Self {
            id,
            generation,
            slice,
            evaluator,
            interval,
        }
    }

    /// Evaluate every order of the slice once, in slice order.
    pub async fn tick(&mut self) -> TickSummary {
        let mut summary = TickSummary::default();
        for slot in &mut self.slice {
            match self.evaluator.evaluate(self.id, slot).await {
                OrderOutcome::Held { .. } => summary.held += 1,
                OrderOutcome::Filled(saved) => {
                    summary.filled += 1;
                    *slot = *saved;
                }
                OrderOutcome::Stale(Some(fresh)) => {
                    summary.skipped += 1;
                    *slot = *fresh;
                }
                OrderOutcome::Stale(None)
                | OrderOutcome::AwaitingReceipt
                | OrderOutcome::Contended
                | OrderOutcome::Inactive => {
                    summary.skipped += 1;
                }
                OrderOutcome::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }

    /// Start the periodic loop on the runtime.
    pub fn spawn(self) -> WorkerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (done_tx, done_rx) = watch::channel(false);
        let id = self.id;
        let orders = self.slice.len();

        tokio::spawn(self.run(stop_rx, done_tx));

        WorkerHandle {
            id,
            orders,
            stop: stop_tx,
            done: done_rx,
        }
    }

    async fn run(mut self, mut stop: watch::Receiver<bool>, done: watch::Sender<bool>) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(
            worker_id = self.id,
            generation = self.generation,
            orders = self.slice.len(),
            "Worker started"
        );

        loop {
            tokio::select! {
                biased;
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    let summary = self.tick().await;
                    if summary.filled > 0 || summary.failed > 0 {
                        info!(
                            worker_id = self.id,
                            generation = self.generation,
                            filled = summary.filled,
                            failed = summary.failed,
                            held = summary.held,
                            "Worker tick finished"
                        );
                    }
                }
            }
        }

        debug!(worker_id = self.id, generation = self.generation, "Worker stopped");
        let _ = done.send(true);
    }
}

/// Control handle of a running worker.
pub struct WorkerHandle {
    id: u64,
    orders: usize,
    stop: watch::Sender<bool>,
    done: watch::Receiver<bool>,
}

impl WorkerHandle {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of orders in the worker's slice.
    #[must_use]
    pub fn orders(&self) -> usize {
        self.orders
    }

    /// Prevent future ticks. An in-flight tick runs to completion.
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }

    /// Wait until the worker loop has exited.
    pub async fn finished(&self) {
        let mut done = self.done.clone();
        // A closed channel means the task is gone, which is also finished.
        let _ = done.wait_for(|finished| *finished).await;
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        *self.done.borrow() || self.done.has_changed().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;
    use crate::testkit::domain::{reserves_for_output, sell_token, OrderBuilder};
    use crate::testkit::harness::Harness;
    use alloy_primitives::Address;

    fn token(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    /// Market order at target 100 against a pair quoting 99.
    fn triggering(harness: &Harness, id: &str, buy: Address) -> Order {
        harness
            .chain
            .set_reserves(sell_token(), buy, reserves_for_output(1000, 99));
        let order = OrderBuilder::new(id).buy_token(buy).target(100).build();
        harness.store.put(order.clone());
        order
    }

    fn worker(harness: &Harness, slice: Vec<Order>, interval: Duration) -> WorkerTask {
        WorkerTask::new(1, 1, slice, harness.evaluator(), interval)
    }

    #[tokio::test]
    async fn tick_evaluates_slice_in_order() {
        let harness = Harness::new(vec![]);
        let slice = vec![
            triggering(&harness, "o-1", token(0x51)),
            triggering(&harness, "o-2", token(0x52)),
            triggering(&harness, "o-3", token(0x53)),
        ];

        let summary = worker(&harness, slice, Duration::from_secs(1)).tick().await;

        assert_eq!(summary.filled, 3);
        let bought: Vec<Address> = harness
            .chain
            .submitted()
            .iter()
            .map(|s| s.call.path[1])
            .collect();
        assert_eq!(bought, vec![token(0x51), token(0x52), token(0x53)]);
    }

    #[tokio::test]
    async fn failing_order_does_not_abort_the_slice() {
        let harness = Harness::new(vec![]);
        let missing = OrderBuilder::new("o-1").buy_token(token(0x99)).build();
        harness.store.put(missing.clone());
        let slice = vec![missing, triggering(&harness, "o-2", token(0x52))];

        let summary = worker(&harness, slice, Duration::from_secs(1)).tick().await;

        assert_eq!(
            summary,
            TickSummary {
                filled: 1,
                failed: 1,
                ..TickSummary::default()
            }
        );
        assert_eq!(harness.store.get("o-2").unwrap().status(), OrderStatus::Filled);
        assert!(harness.store.get("o-1").unwrap().is_active());
    }

    #[tokio::test]
    async fn filled_slot_is_replaced_by_the_saved_order() {
        let harness = Harness::new(vec![]);
        let slice = vec![triggering(&harness, "o-1", token(0x51))];
        let mut task = worker(&harness, slice, Duration::from_secs(1));

        task.tick().await;
        let second = task.tick().await;

        assert_eq!(second.skipped, 1);
        assert_eq!(harness.chain.submissions(), 1);
    }

    #[tokio::test]
    async fn stop_lets_the_running_tick_finish_and_prevents_the_next() {
        let harness = Harness::new(vec![]);
        harness.chain.set_receipt_delay(Duration::from_millis(100));
        let held = OrderBuilder::new("o-2")
            .buy_token(token(0x52))
            .target(200)
            .build();
        harness
            .chain
            .set_reserves(sell_token(), token(0x52), reserves_for_output(1000, 99));
        harness.store.put(held.clone());
        let slice = vec![triggering(&harness, "o-1", token(0x51)), held];

        let handle = worker(&harness, slice, Duration::from_millis(20)).spawn();
        tokio::time::sleep(Duration::from_millis(30)).await;
        handle.stop();
        handle.finished().await;

        assert!(handle.is_finished());
        assert_eq!(harness.store.get("o-1").unwrap().status(), OrderStatus::Filled);
        assert_eq!(harness.chain.quotes(), 2, "one tick over both orders");

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(harness.chain.quotes(), 2);
        assert_eq!(harness.chain.submissions(), 1);
    }
}
