//! Scheduler runtime lifecycle.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::adapter::outbound::realtime::SessionHub;
use crate::application::pool::PoolStats;
use crate::error::Result;
use crate::infrastructure::bootstrap::{build_broadcaster, build_components, build_pool, Components};
use crate::infrastructure::config::settings::Config;

/// Build the production adapters and run until `shutdown` flips to true.
/// Live quotes go to the authenticated sessions of `hub`.
///
/// # Errors
/// Returns startup errors (database, chain client, keystore passphrase) and
/// panics of the background services.
pub async fn run_with_shutdown(
    config: Config,
    hub: Arc<SessionHub>,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let components = build_components(&config, &hub)?;
    run_components(&config, components, shutdown).await?;
    Ok(())
}

/// Run the pool manager and the quote broadcaster against `components`.
///
/// Shutdown stops the broadcaster, then the resize loop, then every worker
/// of the last generation. Returns the final pool statistics.
///
/// # Errors
/// Returns [`Error::Task`](crate::error::Error::Task) if a background
/// service panicked.
pub async fn run_components(
    config: &Config,
    components: Components,
    mut shutdown: watch::Receiver<bool>,
) -> Result<PoolStats> {
    let pool = build_pool(config, &components);
    let pool_service = pool.start();
    info!(
        pool_interval_secs = config.scheduler.pool_interval_secs,
        worker_capacity = config.scheduler.worker_capacity,
        "Scheduler started"
    );

    let broadcast_service = if config.broadcast.enabled {
        Some(build_broadcaster(&components).start(config.broadcast.interval()))
    } else {
        info!("Quote broadcast disabled");
        None
    };

    loop {
        if *shutdown.borrow() {
            break;
        }
        if shutdown.changed().await.is_err() {
            warn!("Shutdown channel closed");
            break;
        }
    }
    info!("Shutdown signal received");

    if let Some(service) = broadcast_service {
        service.shutdown().await?;
    }
    pool_service.shutdown().await?;
    let stats = pool.stats();
    pool.shutdown().await;

    info!(
        generations = stats.generation,
        resizes = stats.resizes,
        failed_fetches = stats.failed_fetches,
        "Scheduler stopped"
    );
    Ok(stats)
}
