//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file with environment variable overrides
//! for deployment-specific values like `RPC_URL`.
//!
//! # Example
//!
//! ```no_run
//! use trigger_swap::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::chain::ChainConfig;
use super::execution::ExecutionConfig;
use super::keys::KeysConfig;
use super::logging::LoggingConfig;
use super::scheduler::{BroadcastConfig, SchedulerConfig, TriggerConfig};
use crate::error::{ConfigError, Result};

/// Environment variable overriding `[chain] rpc_url`.
pub const RPC_URL_ENV: &str = "RPC_URL";

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Worker pool cadence and sizing.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub trigger: TriggerConfig,

    /// Swap transaction settings.
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Live quote push to connected sessions.
    #[serde(default)]
    pub broadcast: BroadcastConfig,

    /// RPC endpoint and contract addresses.
    #[serde(default)]
    pub chain: ChainConfig,

    #[serde(default)]
    pub keys: KeysConfig,

    /// Path to SQLite database file.
    ///
    /// Defaults to "trigger-swap.db" in the current directory.
    #[serde(default = "default_database_path")]
    pub database: String,
}

fn default_database_path() -> String {
    "trigger-swap.db".to_string()
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Applies the `RPC_URL` override before validating.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        if let Ok(rpc_url) = std::env::var(RPC_URL_ENV) {
            if !rpc_url.trim().is_empty() {
                config.chain.rpc_url = rpc_url;
            }
        }

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is
    /// malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        let scheduler = &self.scheduler;
        if scheduler.pool_interval_secs == 0 {
            return Err(positive("pool_interval_secs"));
        }
        if scheduler.worker_interval_secs == 0 {
            return Err(positive("worker_interval_secs"));
        }
        if scheduler.worker_capacity == 0 {
            return Err(positive("worker_capacity"));
        }
        if self.trigger.band_percent <= Decimal::ZERO {
            return Err(positive("band_percent"));
        }
        if self.execution.deadline_secs == 0 {
            return Err(positive("deadline_secs"));
        }
        if self.execution.receipt_poll_ms == 0 {
            return Err(positive("receipt_poll_ms"));
        }
        if self.execution.receipt_timeout_secs == Some(0) {
            return Err(positive("receipt_timeout_secs"));
        }
        if self.broadcast.enabled && self.broadcast.interval_secs == 0 {
            return Err(positive("broadcast.interval_secs"));
        }
        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }

        self.chain.rpc_url()?;
        self.chain.addresses()?;
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

fn positive(field: &'static str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: "must be greater than 0".to_string(),
    }
    .into()
}
