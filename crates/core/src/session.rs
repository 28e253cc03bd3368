//! Draw session state: cooldown arithmetic and the choice window.
//!
//! A session is created only after the cooldown slot has been claimed and
//! all candidates were drawn, so it starts in `AwaitingChoice`. The only
//! ways out are [`DrawSession::take_choice`] and [`DrawSession::expire`].

use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::drawer::Candidate;
use crate::error::GachaError;
use crate::types::{DbId, Timestamp};

/// Candidates presented per draw.
pub const CANDIDATES_PER_DRAW: usize = 3;

/// Default cooldown between draws (15 minutes).
pub const DEFAULT_COOLDOWN_SECS: i64 = 15 * 60;

/// Default time the user has to pick a candidate.
pub const DEFAULT_CHOICE_TIMEOUT_SECS: i64 = 60;

/// Seconds left before `user` may draw again, or `None` if the cooldown has
/// elapsed (or the user never drew).
pub fn cooldown_remaining(
    last_draw_at: Option<Timestamp>,
    now: Timestamp,
    cooldown_secs: i64,
) -> Option<i64> {
    let last = last_draw_at?;
    let elapsed_ms = (now - last).num_milliseconds();
    let cooldown_ms = cooldown_secs * 1000;
    if elapsed_ms >= cooldown_ms {
        return None;
    }
    // Round up so a caller never sees "0 seconds" while still blocked.
    Some((cooldown_ms - elapsed_ms + 999) / 1000)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    AwaitingChoice,
    Committed,
    Expired,
}

/// Candidates on offer to one user, with a hard deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawSession {
    pub id: Uuid,
    pub user_id: DbId,
    pub candidates: Vec<Candidate>,
    pub banner_name: Option<String>,
    pub created_at: Timestamp,
    pub deadline: Timestamp,
    state: SessionState,
}

impl DrawSession {
    /// Open a session over exactly [`CANDIDATES_PER_DRAW`] candidates.
    pub fn open(
        user_id: DbId,
        candidates: Vec<Candidate>,
        banner_name: Option<String>,
        now: Timestamp,
        choice_timeout: Duration,
    ) -> Result<Self, GachaError> {
        if candidates.len() != CANDIDATES_PER_DRAW {
            return Err(GachaError::ExternalSourceUnavailable);
        }
        Ok(Self {
            id: Uuid::now_v7(),
            user_id,
            candidates,
            banner_name,
            created_at: now,
            deadline: now + choice_timeout,
            state: SessionState::AwaitingChoice,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_overdue(&self, now: Timestamp) -> bool {
        now >= self.deadline
    }

    /// Resolve the user's pick.
    ///
    /// A caller other than the initiator or an out-of-range index leaves
    /// the session untouched. A pick at or after the deadline moves the
    /// session to `Expired`. A valid pick moves it to `Committed` and hands
    /// back the chosen candidate for persistence.
    pub fn take_choice(
        &mut self,
        caller_id: DbId,
        index: usize,
        now: Timestamp,
    ) -> Result<Candidate, GachaError> {
        match self.state {
            SessionState::AwaitingChoice => {}
            SessionState::Expired => return Err(GachaError::SessionExpired),
            SessionState::Committed => {
                return Err(GachaError::InvalidState(
                    "Draw session already committed".to_string(),
                ))
            }
        }
        if caller_id != self.user_id {
            return Err(GachaError::NotAuthorized(
                "Only the user who started the draw can choose".to_string(),
            ));
        }
        if self.is_overdue(now) {
            self.state = SessionState::Expired;
            return Err(GachaError::SessionExpired);
        }
        let chosen = self
            .candidates
            .get(index)
            .cloned()
            .ok_or(GachaError::InvalidChoice(index))?;
        self.state = SessionState::Committed;
        Ok(chosen)
    }

    /// Drop the offer without persisting anything.
    pub fn expire(&mut self) {
        if self.state == SessionState::AwaitingChoice {
            self.state = SessionState::Expired;
        }
    }
}
