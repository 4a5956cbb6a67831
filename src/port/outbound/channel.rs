//! Real-time channel port used to push live quotes to connected clients.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::id::UserId;
use crate::error::Result;

/// A connected client session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: u64,
    /// Set once the session has authenticated.
    pub user: Option<UserId>,
}

impl Session {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Port for pushing events to connected sessions.
#[async_trait]
pub trait RealtimeChannel: Send + Sync {
    /// Snapshot of the currently connected sessions.
    fn sessions(&self) -> Vec<Session>;

    /// Push `event` with a JSON payload to one session.
    async fn push(&self, session: &Session, event: &str, payload: Value) -> Result<()>;
}
