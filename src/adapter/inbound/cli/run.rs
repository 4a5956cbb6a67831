//! Handler for the `run` command.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::adapter::inbound::cli::output;
use crate::adapter::outbound::realtime::SessionHub;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::runtime;

/// Run until Ctrl-C.
pub async fn execute(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    config.init_logging();

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Config", config_path.display());
    output::field("Database", &config.database);
    output::field("Chain ID", config.chain.chain_id);
    output::field("Capacity", config.scheduler.worker_capacity);
    output::field("Trigger band", format!("{}%", config.trigger.band_percent));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received"),
            Err(err) => warn!(error = %err, "Failed to listen for Ctrl-C"),
        }
        let _ = shutdown_tx.send(true);
    });

    // No client transport is attached to the CLI; the hub stays empty and the
    // broadcaster idles.
    let hub = Arc::new(SessionHub::default());
    runtime::run_with_shutdown(config, hub, shutdown_rx).await
}
