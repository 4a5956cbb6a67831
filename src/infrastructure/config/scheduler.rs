//! Scheduler, trigger and broadcast configuration.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::pool::{SchedulerSettings, DEFAULT_WORKER_CAPACITY};
use crate::domain::trigger::{TriggerPolicy, DEFAULT_TRIGGER_BAND};

/// Worker pool cadence and sizing.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between pool resizes.
    #[serde(default = "default_pool_interval_secs")]
    pub pool_interval_secs: u64,
    /// Seconds between ticks of each worker.
    #[serde(default = "default_worker_interval_secs")]
    pub worker_interval_secs: u64,
    /// Maximum orders per worker.
    #[serde(default = "default_worker_capacity")]
    pub worker_capacity: usize,
    /// Milliseconds a resize waits for retiring workers.
    #[serde(default = "default_stop_grace_ms")]
    pub stop_grace_ms: u64,
}

fn default_pool_interval_secs() -> u64 {
    5
}

fn default_worker_interval_secs() -> u64 {
    1
}

fn default_worker_capacity() -> usize {
    DEFAULT_WORKER_CAPACITY
}

fn default_stop_grace_ms() -> u64 {
    2000
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            pool_interval_secs: default_pool_interval_secs(),
            worker_interval_secs: default_worker_interval_secs(),
            worker_capacity: default_worker_capacity(),
            stop_grace_ms: default_stop_grace_ms(),
        }
    }
}

impl SchedulerConfig {
    #[must_use]
    pub fn settings(&self) -> SchedulerSettings {
        SchedulerSettings {
            pool_interval: Duration::from_secs(self.pool_interval_secs),
            worker_interval: Duration::from_secs(self.worker_interval_secs),
            worker_capacity: self.worker_capacity,
            stop_grace: Duration::from_millis(self.stop_grace_ms),
        }
    }
}

/// Trigger window configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerConfig {
    /// Half-width of the trigger window in percent.
    #[serde(default = "default_band_percent")]
    pub band_percent: Decimal,
}

fn default_band_percent() -> Decimal {
    DEFAULT_TRIGGER_BAND
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            band_percent: default_band_percent(),
        }
    }
}

impl TriggerConfig {
    #[must_use]
    pub fn policy(&self) -> TriggerPolicy {
        TriggerPolicy::new(self.band_percent)
    }
}

/// Live quote broadcast configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastConfig {
    #[serde(default = "default_broadcast_enabled")]
    pub enabled: bool,
    #[serde(default = "default_broadcast_interval_secs")]
    pub interval_secs: u64,
}

fn default_broadcast_enabled() -> bool {
    true
}

fn default_broadcast_interval_secs() -> u64 {
    10
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            enabled: default_broadcast_enabled(),
            interval_secs: default_broadcast_interval_secs(),
        }
    }
}

impl BroadcastConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
