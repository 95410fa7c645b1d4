use chrono::{DateTime, Utc};
use serde::Serialize;

use super::session::{CaptureSession, SessionId, SessionState};
use crate::geometry::SelectionRect;
use crate::stream::CaptureKind;

/// Observable session state for UI binding.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub kind: CaptureKind,
    pub state: SessionState,
    pub started_at: DateTime<Utc>,

    /// Whole seconds of active recording time (pause windows excluded).
    pub elapsed_seconds: u64,

    /// In-progress selection rect, still-image sessions only.
    pub current_rect: Option<SelectionRect>,

    /// Human-readable error, present only for failed sessions.
    pub error: Option<String>,
}

impl SessionSnapshot {
    pub(crate) fn of(session: &CaptureSession) -> Self {
        Self {
            id: session.id,
            kind: session.kind,
            state: session.state,
            started_at: session.started_at,
            elapsed_seconds: session.timer.elapsed_secs(),
            current_rect: session.tracker.current_rect(),
            error: session.last_error.as_ref().map(|e| e.to_string()),
        }
    }
}
