//! Adaptive worker pool.
//!
//! Every pool tick the manager fetches the active orders, computes how many
//! workers are needed at the configured capacity, retires the whole current
//! generation and starts a fresh one over contiguous chunks of the fetched
//! list. Generations are immutable and swapped atomically, so readers never
//! observe a half-built pool.
//!
//! A failed fetch leaves the running generation untouched for that tick.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::evaluation::OrderEvaluator;
use super::service::{spawn_periodic, ServiceHandle};
use super::worker::{WorkerHandle, WorkerTask};
use crate::domain::order::Order;
use crate::error::Result;
use crate::port::outbound::store::OrderStore;

/// Default maximum number of orders per worker.
pub const DEFAULT_WORKER_CAPACITY: usize = 200;

/// Cadence and sizing of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    pub pool_interval: Duration,
    pub worker_interval: Duration,
    pub worker_capacity: usize,
    /// How long a resize waits for retiring workers before detaching them.
    pub stop_grace: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            pool_interval: Duration::from_secs(5),
            worker_interval: Duration::from_secs(1),
            worker_capacity: DEFAULT_WORKER_CAPACITY,
            stop_grace: Duration::from_secs(2),
        }
    }
}

/// Number of workers needed for `count` orders: `ceil(count / capacity)`.
#[must_use]
pub fn required_workers(count: usize, capacity: usize) -> usize {
    if capacity == 0 {
        return 0;
    }
    count.div_ceil(capacity)
}

/// Split `orders` into contiguous chunks of at most `capacity`, keeping order.
#[must_use]
pub fn partition(orders: Vec<Order>, capacity: usize) -> Vec<Vec<Order>> {
    if capacity == 0 {
        return Vec::new();
    }
    let mut slices = Vec::with_capacity(required_workers(orders.len(), capacity));
    let mut remaining = orders.into_iter().peekable();
    while remaining.peek().is_some() {
        slices.push(remaining.by_ref().take(capacity).collect());
    }
    slices
}

/// One immutable set of running workers.
pub struct Generation {
    number: u64,
    orders: usize,
    workers: Vec<WorkerHandle>,
}

impl Generation {
    fn empty(number: u64) -> Self {
        Self {
            number,
            orders: 0,
            workers: Vec::new(),
        }
    }

    #[must_use]
    pub fn number(&self) -> u64 {
        self.number
    }

    #[must_use]
    pub fn workers(&self) -> &[WorkerHandle] {
        &self.workers
    }
}

/// Observable pool state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub generation: u64,
    pub workers: usize,
    pub orders: usize,
    pub resizes: u64,
    pub failed_fetches: u64,
}

/// Owns the current worker generation and resizes it.
pub struct PoolManager {
    store: Arc<dyn OrderStore>,
    evaluator: Arc<OrderEvaluator>,
    settings: SchedulerSettings,
    current: RwLock<Arc<Generation>>,
    resizing: Mutex<()>,
    next_worker_id: AtomicU64,
    resizes: AtomicU64,
    failed_fetches: AtomicU64,
}

impl PoolManager {
    pub fn new(
        store: Arc<dyn OrderStore>,
        evaluator: Arc<OrderEvaluator>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            store,
            evaluator,
            settings,
            current: RwLock::new(Arc::new(Generation::empty(0))),
            resizing: Mutex::new(()),
            next_worker_id: AtomicU64::new(1),
            resizes: AtomicU64::new(0),
            failed_fetches: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// The generation currently running.
    #[must_use]
    pub fn generation(&self) -> Arc<Generation> {
        Arc::clone(&self.current.read())
    }

    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let current = self.generation();
        PoolStats {
            generation: current.number,
            workers: current.workers.len(),
            orders: current.orders,
            resizes: self.resizes.load(Ordering::Relaxed),
            failed_fetches: self.failed_fetches.load(Ordering::Relaxed),
        }
    }

    /// Replace the running generation with one sized to the active set.
    ///
    /// # Errors
    ///
    /// Returns the store error when the active orders cannot be fetched; the
    /// previous generation keeps running in that case.
    pub async fn resize(&self) -> Result<PoolStats> {
        let _resizing = self.resizing.lock().await;

        let orders = match self.store.find_active().await {
            Ok(orders) => orders,
            Err(err) => {
                self.failed_fetches.fetch_add(1, Ordering::Relaxed);
                warn!(error = %err, "Failed to fetch active orders, keeping current workers");
                return Err(err);
            }
        };

        let previous = self.generation();
        self.retire(&previous).await;

        let number = previous.number + 1;
        let count = orders.len();
        let workers: Vec<WorkerHandle> = partition(orders, self.settings.worker_capacity)
            .into_iter()
            .map(|slice| {
                let id = self.next_worker_id.fetch_add(1, Ordering::Relaxed);
                WorkerTask::new(
                    id,
                    number,
                    slice,
                    Arc::clone(&self.evaluator),
                    self.settings.worker_interval,
                )
                .spawn()
            })
            .collect();

        let worker_count = workers.len();
        *self.current.write() = Arc::new(Generation {
            number,
            orders: count,
            workers,
        });
        self.resizes.fetch_add(1, Ordering::Relaxed);

        if worker_count != previous.workers.len() {
            info!(
                generation = number,
                workers = worker_count,
                orders = count,
                "Worker pool resized"
            );
        }
        Ok(self.stats())
    }

    /// Start resizing on the configured pool interval.
    pub fn start(self: &Arc<Self>) -> ServiceHandle {
        let manager = Arc::clone(self);
        spawn_periodic("pool", self.settings.pool_interval, move || {
            let manager = Arc::clone(&manager);
            async move {
                // Failures are logged in resize and retried next tick.
                let _ = manager.resize().await;
            }
        })
    }

    /// Stop every worker of the current generation.
    pub async fn shutdown(&self) {
        let _resizing = self.resizing.lock().await;
        let current = self.generation();
        self.retire(&current).await;
        *self.current.write() = Arc::new(Generation::empty(current.number));
        info!(generation = current.number, "Worker pool stopped");
    }

    async fn retire(&self, generation: &Generation) {
        if generation.workers.is_empty() {
            return;
        }
        for worker in &generation.workers {
            worker.stop();
        }

        let all_finished =
            futures_util::future::join_all(generation.workers.iter().map(WorkerHandle::finished));
        if tokio::time::timeout(self.settings.stop_grace, all_finished)
            .await
            .is_err()
        {
            let pending = generation
                .workers
                .iter()
                .filter(|worker| !worker.is_finished())
                .count();
            warn!(
                generation = generation.number,
                pending,
                "Workers still finishing after grace period, detaching"
            );
        }
    }
}
