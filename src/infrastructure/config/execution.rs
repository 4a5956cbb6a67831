//! Transaction building and confirmation settings.

use std::time::Duration;

use serde::Deserialize;

use crate::application::execution::{ExecutionSettings, DEFAULT_GAS_BUFFER_PERCENT};

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionConfig {
    /// Seconds a swap stays valid after it is built.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    /// Headroom over the gas estimate, in percent.
    #[serde(default = "default_gas_buffer_percent")]
    pub gas_buffer_percent: u64,
    /// Milliseconds between receipt polls.
    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u64,
    /// Give up waiting for a receipt after this many seconds. Unset waits
    /// indefinitely.
    #[serde(default)]
    pub receipt_timeout_secs: Option<u64>,
}

fn default_deadline_secs() -> u64 {
    1200 // 20 minutes
}

fn default_gas_buffer_percent() -> u64 {
    DEFAULT_GAS_BUFFER_PERCENT
}

fn default_receipt_poll_ms() -> u64 {
    1000
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            deadline_secs: default_deadline_secs(),
            gas_buffer_percent: default_gas_buffer_percent(),
            receipt_poll_ms: default_receipt_poll_ms(),
            receipt_timeout_secs: None,
        }
    }
}

impl ExecutionConfig {
    #[must_use]
    pub fn settings(&self) -> ExecutionSettings {
        ExecutionSettings {
            deadline: Duration::from_secs(self.deadline_secs),
            gas_buffer_percent: self.gas_buffer_percent,
            receipt_timeout: self.receipt_timeout_secs.map(Duration::from_secs),
        }
    }

    #[must_use]
    pub fn receipt_poll(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_ms)
    }
}
