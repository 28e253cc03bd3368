//! In-memory store of open draw sessions.
//!
//! Sessions are ephemeral: nothing about an uncommitted offer is persisted,
//! so a restart simply drops them. A session leaves the store as soon as it
//! reaches a terminal state.

use std::collections::HashMap;

use cardpull_core::drawer::Candidate;
use cardpull_core::error::GachaError;
use cardpull_core::session::{DrawSession, SessionState};
use cardpull_core::types::{DbId, Timestamp};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, DrawSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: DrawSession) {
        self.sessions.lock().await.insert(session.id, session);
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Resolve a pick. The session is removed once it commits or expires;
    /// a rejected caller or index leaves it open.
    pub async fn take_choice(
        &self,
        id: Uuid,
        caller_id: DbId,
        index: usize,
        now: Timestamp,
    ) -> Result<Candidate, GachaError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&id).ok_or(GachaError::SessionNotFound)?;
        let result = session.take_choice(caller_id, index, now);
        if session.state() != SessionState::AwaitingChoice {
            sessions.remove(&id);
        }
        result
    }

    /// Discard a session without persisting anything.
    pub async fn expire(&self, id: Uuid) -> Result<(), GachaError> {
        let mut session = self
            .sessions
            .lock()
            .await
            .remove(&id)
            .ok_or(GachaError::SessionNotFound)?;
        session.expire();
        Ok(())
    }

    /// Discard every session whose deadline has passed. Returns how many
    /// were dropped.
    pub async fn expire_overdue(&self, now: Timestamp) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_overdue(now));
        before - sessions.len()
    }

    /// Drop every open session. Returns how many there were.
    pub async fn clear(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        let count = sessions.len();
        sessions.clear();
        count
    }
}
