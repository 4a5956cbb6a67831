//! Periodic background jobs with explicit stop signals.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Handle for controlling a periodic job's lifecycle.
pub struct ServiceHandle {
    name: &'static str,
    stop: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl ServiceHandle {
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Signal the job to stop and wait for its in-flight run to finish.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Task`] if the job panicked.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.stop.send(true);
        self.join
            .await
            .map_err(|e| Error::Task(format!("{}: {e}", self.name)))?;
        info!(service = self.name, "Service stopped");
        Ok(())
    }
}

/// Run `job` every `period` until stopped.
///
/// The first run happens immediately. A run is always awaited to completion
/// before the next tick is polled, and missed ticks are delayed, so the job
/// never overlaps itself.
pub fn spawn_periodic<F, Fut>(name: &'static str, period: Duration, mut job: F) -> ServiceHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (stop_tx, mut stop_rx) = watch::channel(false);

    let join = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(service = name, period_ms = period.as_millis() as u64, "Service started");

        loop {
            tokio::select! {
                biased;
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => job().await,
            }
        }
    });

    ServiceHandle {
        name,
        stop: stop_tx,
        join,
    }
}
