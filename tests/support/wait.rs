//! Polling helpers for tests that run real background tasks.

use std::time::Duration;

use tokio::time::{sleep, Instant};

const POLL: Duration = Duration::from_millis(10);

/// Poll `condition` until it holds or `timeout` elapses.
pub async fn until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(POLL).await;
    }
}
