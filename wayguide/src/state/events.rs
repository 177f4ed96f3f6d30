//! Change events published by the state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::context::SessionContext;
use super::phase::NavigationPhase;

/// What kind of change an event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEventKind {
    /// Phase changed
    Transition,
    /// Context changed, phase did not
    ContextUpdate,
    /// Explicit reset to welcome
    Reset,
    /// State replaced from a persisted snapshot
    Restored,
}

/// One change to a session, carrying the post-change context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEvent {
    /// Monotonic per session, starting at 1
    pub sequence: u64,
    pub session_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: SessionEventKind,
    pub from: NavigationPhase,
    pub to: NavigationPhase,
    pub context: SessionContext,
}

impl SessionEvent {
    pub fn is_transition(&self) -> bool {
        self.from != self.to
    }
}
