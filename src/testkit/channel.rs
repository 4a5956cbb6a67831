//! Recording [`RealtimeChannel`] for broadcast tests.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::domain::id::UserId;
use crate::error::{Error, Result};
use crate::port::outbound::channel::{RealtimeChannel, Session};

/// One pushed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Pushed {
    pub session: u64,
    pub event: String,
    pub payload: Value,
}

/// Holds a fixed session list and records every push.
#[derive(Default)]
pub struct RecordingChannel {
    sessions: Mutex<Vec<Session>>,
    failing: Mutex<HashSet<u64>>,
    pushed: Mutex<Vec<Pushed>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session; `user` is `None` for unauthenticated sessions.
    pub fn connect(&self, id: u64, user: Option<&str>) {
        self.sessions.lock().push(Session {
            id,
            user: user.map(UserId::new),
        });
    }

    /// Make pushes to session `id` fail.
    pub fn fail_session(&self, id: u64) {
        self.failing.lock().insert(id);
    }

    pub fn pushed(&self) -> Vec<Pushed> {
        self.pushed.lock().clone()
    }

    /// Frames pushed to session `id`.
    pub fn pushed_to(&self, id: u64) -> Vec<Pushed> {
        self.pushed
            .lock()
            .iter()
            .filter(|p| p.session == id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RealtimeChannel for RecordingChannel {
    fn sessions(&self) -> Vec<Session> {
        self.sessions.lock().clone()
    }

    async fn push(&self, session: &Session, event: &str, payload: Value) -> Result<()> {
        if self.failing.lock().contains(&session.id) {
            return Err(Error::Channel(format!("session {} closed", session.id)));
        }
        self.pushed.lock().push(Pushed {
            session: session.id,
            event: event.to_string(),
            payload,
        });
        Ok(())
    }
}
