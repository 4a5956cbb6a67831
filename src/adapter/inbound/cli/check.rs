//! Handler for the `check-config` command.

use std::path::Path;

use crate::adapter::inbound::cli::output;
use crate::domain::token::address_key;
use crate::error::Result;
use crate::infrastructure::config::keys::{
    read_keystore_password, KEYSTORE_PASSWORD_ENV, KEYSTORE_PASSWORD_FILE_ENV,
};
use crate::infrastructure::config::settings::Config;

/// Validate the configuration file without starting the scheduler.
pub fn execute(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let addresses = config.chain.addresses()?;

    output::section("Configuration Check");
    output::field("Config", config_path.display());
    output::success("Configuration file is valid");

    output::section("Summary");
    output::field("RPC URL", config.chain.rpc_url()?);
    output::field("Chain ID", config.chain.chain_id);
    output::field("Router", address_key(&addresses.router));
    output::field("Factory", address_key(&addresses.factory));
    output::field("Wrapped", address_key(&addresses.wrapped_native));
    output::field("Database", &config.database);
    output::field("Keystores", &config.keys.keystore_dir);
    output::field(
        "Cadence",
        format!(
            "pool {}s, worker {}s, capacity {}",
            config.scheduler.pool_interval_secs,
            config.scheduler.worker_interval_secs,
            config.scheduler.worker_capacity
        ),
    );
    output::field("Band", format!("{}%", config.trigger.band_percent));
    output::field(
        "Broadcast",
        if config.broadcast.enabled {
            format!("every {}s", config.broadcast.interval_secs)
        } else {
            "disabled".to_string()
        },
    );

    if read_keystore_password().is_ok() {
        output::success("Keystore passphrase detected");
    } else {
        output::warning(&format!(
            "Keystore passphrase not configured (set {KEYSTORE_PASSWORD_ENV} or {KEYSTORE_PASSWORD_FILE_ENV})"
        ));
    }

    output::success("Configuration check complete");
    Ok(())
}
