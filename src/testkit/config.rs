//! Canonical test configurations.
//!
//! Single source of truth for config values used across tests.

use std::time::Duration;

use crate::application::execution::ExecutionSettings;
use crate::application::pool::SchedulerSettings;

/// A complete, valid configuration file pointing at a local node.
pub const VALID_TOML: &str = r#"
database = "orders.db"

[logging]
level = "warn"

[scheduler]
pool_interval_secs = 1
worker_interval_secs = 1
worker_capacity = 2
stop_grace_ms = 200

[broadcast]
enabled = true
interval_secs = 1

[chain]
rpc_url = "http://localhost:8545"
chain_id = 31337
router_address = "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D"
factory_address = "0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f"
wrapped_native_address = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"

[keys]
keystore_dir = "keystores"
"#;

/// Scheduler cadence fast enough for tests: workers tick every 20 ms.
pub fn scheduler(worker_capacity: usize) -> SchedulerSettings {
    SchedulerSettings {
        pool_interval: Duration::from_millis(50),
        worker_interval: Duration::from_millis(20),
        worker_capacity,
        stop_grace: Duration::from_millis(200),
    }
}

/// Default execution settings with a bounded receipt wait.
pub fn execution() -> ExecutionSettings {
    ExecutionSettings {
        receipt_timeout: Some(Duration::from_secs(2)),
        ..ExecutionSettings::default()
    }
}
