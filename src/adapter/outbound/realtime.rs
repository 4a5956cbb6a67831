//! In-process session registry for the real-time channel.
//!
//! Each connected client gets a bounded queue of [`Frame`]s. Whatever owns the
//! client transport drains the receiver returned by [`SessionHub::register`].

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::id::UserId;
use crate::error::{Error, Result};
use crate::port::outbound::channel::{RealtimeChannel, Session};

/// Per-session queue depth.
pub const DEFAULT_SESSION_CAPACITY: usize = 64;

/// One pushed event as delivered to a client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub event: String,
    pub payload: Value,
}

struct Entry {
    user: Option<UserId>,
    sender: mpsc::Sender<Frame>,
}

/// Registry of connected sessions.
pub struct SessionHub {
    sessions: DashMap<u64, Entry>,
    next_id: AtomicU64,
    capacity: usize,
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_CAPACITY)
    }
}

impl SessionHub {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            next_id: AtomicU64::new(1),
            capacity: capacity.max(1),
        }
    }

    /// Register an unauthenticated session.
    pub fn register(&self) -> (u64, mpsc::Receiver<Frame>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel(self.capacity);
        self.sessions.insert(id, Entry { user: None, sender });
        debug!(session_id = id, "Session registered");
        (id, receiver)
    }

    /// Attach a user to a session. Returns false for unknown sessions.
    pub fn authenticate(&self, id: u64, user: UserId) -> bool {
        match self.sessions.get_mut(&id) {
            Some(mut entry) => {
                debug!(session_id = id, user_id = %user, "Session authenticated");
                entry.user = Some(user);
                true
            }
            None => false,
        }
    }

    pub fn disconnect(&self, id: u64) {
        if self.sessions.remove(&id).is_some() {
            debug!(session_id = id, "Session disconnected");
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl RealtimeChannel for SessionHub {
    fn sessions(&self) -> Vec<Session> {
        let mut sessions: Vec<Session> = self
            .sessions
            .iter()
            .map(|entry| Session {
                id: *entry.key(),
                user: entry.user.clone(),
            })
            .collect();
        sessions.sort_by_key(|s| s.id);
        sessions
    }

    async fn push(&self, session: &Session, event: &str, payload: Value) -> Result<()> {
        let sender = self
            .sessions
            .get(&session.id)
            .map(|entry| entry.sender.clone())
            .ok_or_else(|| Error::Channel(format!("session {} is gone", session.id)))?;

        let frame = Frame {
            event: event.to_string(),
            payload,
        };
        match sender.try_send(frame) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => Err(Error::Channel(format!(
                "session {} is not keeping up",
                session.id
            ))),
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.disconnect(session.id);
                Err(Error::Channel(format!("session {} closed", session.id)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn pushes_reach_the_session_receiver() {
        let hub = SessionHub::default();
        let (id, mut rx) = hub.register();
        assert!(hub.authenticate(id, UserId::new("user-1")));

        let session = hub.sessions().remove(0);
        assert!(session.is_authenticated());
        hub.push(&session, "order_rates", json!({"o-1": "99"}))
            .await
            .unwrap();

        let frame = rx.recv().await.unwrap();
        assert_eq!(frame.event, "order_rates");
        assert_eq!(frame.payload, json!({"o-1": "99"}));
    }

    #[tokio::test]
    async fn closed_receiver_drops_the_session() {
        let hub = SessionHub::default();
        let (id, rx) = hub.register();
        drop(rx);

        let session = Session { id, user: None };
        assert!(hub.push(&session, "order_rates", json!({})).await.is_err());
        assert!(hub.is_empty());
    }

    #[tokio::test]
    async fn full_queue_is_an_error_but_keeps_the_session() {
        let hub = SessionHub::new(1);
        let (id, _rx) = hub.register();
        let session = Session { id, user: None };

        hub.push(&session, "e", json!(1)).await.unwrap();
        assert!(hub.push(&session, "e", json!(2)).await.is_err());
        assert_eq!(hub.len(), 1);
    }

    #[test]
    fn authenticate_unknown_session_is_false() {
        let hub = SessionHub::default();
        assert!(!hub.authenticate(42, UserId::new("user-1")));
    }
}
