//! Live quote broadcasting to connected owners.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::pricing::PriceEvaluator;
use super::service::{spawn_periodic, ServiceHandle};
use crate::domain::id::UserId;
use crate::error::Result;
use crate::port::outbound::channel::{RealtimeChannel, Session};
use crate::port::outbound::store::OrderStore;

/// Event name carrying the `order id -> quoted output` map.
pub const ORDER_RATES_EVENT: &str = "order_rates";

/// Default broadcast cadence.
pub const DEFAULT_BROADCAST_INTERVAL: Duration = Duration::from_secs(10);

/// Counts from one broadcast cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub orders: usize,
    pub quoted: usize,
    pub failed_quotes: usize,
    pub pushed: usize,
}

/// Quotes the active orders of connected owners and pushes per-owner rate
/// maps.
pub struct QuoteBroadcaster {
    store: Arc<dyn OrderStore>,
    pricing: PriceEvaluator,
    channel: Arc<dyn RealtimeChannel>,
}

impl QuoteBroadcaster {
    pub fn new(
        store: Arc<dyn OrderStore>,
        pricing: PriceEvaluator,
        channel: Arc<dyn RealtimeChannel>,
    ) -> Self {
        Self {
            store,
            pricing,
            channel,
        }
    }

    /// Run one broadcast cycle.
    ///
    /// Only orders whose owner has an authenticated session are quoted; with
    /// no such session the cycle does nothing. Failed quotes are left out of
    /// the map. Push failures are logged and do not stop delivery to other
    /// sessions.
    ///
    /// # Errors
    ///
    /// Returns the store error when active orders cannot be fetched; nothing
    /// is pushed in that case.
    pub async fn broadcast(&self) -> Result<BroadcastReport> {
        let sessions: Vec<Session> = self
            .channel
            .sessions()
            .into_iter()
            .filter(Session::is_authenticated)
            .collect();
        if sessions.is_empty() {
            debug!("No authenticated sessions, skipping order rates");
            return Ok(BroadcastReport::default());
        }
        let owners: HashSet<&UserId> = sessions.iter().filter_map(|s| s.user.as_ref()).collect();

        let orders = self.store.find_active().await?;
        let mut report = BroadcastReport {
            orders: orders.len(),
            ..BroadcastReport::default()
        };

        let mut rates: HashMap<UserId, Map<String, Value>> = HashMap::new();
        for order in orders.iter().filter(|o| owners.contains(&o.owner)) {
            match self.pricing.quote(order).await {
                Ok(output) => {
                    report.quoted += 1;
                    rates
                        .entry(order.owner.clone())
                        .or_default()
                        .insert(order.id.to_string(), Value::String(output.to_string()));
                }
                Err(err) => {
                    report.failed_quotes += 1;
                    debug!(order_id = %order.id, error = %err, "Quote failed, omitting from rates");
                }
            }
        }

        for session in sessions {
            let Some(rates) = session.user.as_ref().and_then(|user| rates.get(user)) else {
                continue;
            };
            match self
                .channel
                .push(&session, ORDER_RATES_EVENT, Value::Object(rates.clone()))
                .await
            {
                Ok(()) => report.pushed += 1,
                Err(err) => {
                    warn!(session_id = session.id, error = %err, "Failed to push order rates");
                }
            }
        }

        debug!(
            orders = report.orders,
            quoted = report.quoted,
            pushed = report.pushed,
            "Order rates broadcast"
        );
        Ok(report)
    }

    /// Broadcast every `interval` until stopped.
    pub fn start(self: &Arc<Self>, interval: Duration) -> ServiceHandle {
        let broadcaster = Arc::clone(self);
        info!(interval_secs = interval.as_secs(), "Starting quote broadcaster");
        spawn_periodic("broadcast", interval, move || {
            let broadcaster = Arc::clone(&broadcaster);
            async move {
                if let Err(err) = broadcaster.broadcast().await {
                    warn!(error = %err, "Skipping broadcast cycle");
                }
            }
        })
    }
}
