use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::CaptureError;
use crate::geometry::GeometryTracker;
use crate::recorder::{ChunkRecorder, MediaArtifact};
use crate::stream::CaptureKind;
use crate::timer::SessionTimer;

pub type SessionId = Uuid;

/// Session lifecycle.
///
/// `Idle` has no representation here: before `start_session` there simply is
/// no session object and no resources are held. `Cancelled` and `Failed` are
/// reachable from every non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Awaiting asynchronous device-stream acquisition.
    Requesting,
    /// Still image: user is dragging a selection rectangle.
    Selecting,
    /// Video/audio: recorder gathering chunks, timer counting.
    Active,
    /// Video/audio: recorder and timer suspended in lock-step.
    ActivePaused,
    /// Assembling the final artifact.
    Finalizing,
    Completed,
    Cancelled,
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Cancelled | SessionState::Failed
        )
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            SessionState::Requesting => "requesting",
            SessionState::Selecting => "selecting",
            SessionState::Active => "active",
            SessionState::ActivePaused => "active_paused",
            SessionState::Finalizing => "finalizing",
            SessionState::Completed => "completed",
            SessionState::Cancelled => "cancelled",
            SessionState::Failed => "failed",
        }
    }
}

/// One end-to-end capture attempt of a single kind.
///
/// Owns every acquired resource for its lifetime: the stream (inside the
/// recorder), the chunk list, the timer's tick source and the selection
/// tracker. Nothing outside the controller may touch them.
pub struct CaptureSession {
    pub(crate) id: SessionId,
    pub(crate) kind: CaptureKind,
    pub(crate) state: SessionState,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) tracker: GeometryTracker,
    pub(crate) recorder: Option<ChunkRecorder>,
    pub(crate) timer: SessionTimer,
    pub(crate) artifact: Option<MediaArtifact>,
    pub(crate) last_error: Option<CaptureError>,
    released: bool,
}

impl CaptureSession {
    pub(crate) fn new(kind: CaptureKind, state: SessionState, min_selection_dim: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            state,
            started_at: Utc::now(),
            tracker: GeometryTracker::new(min_selection_dim),
            recorder: None,
            timer: SessionTimer::new(),
            artifact: None,
            last_error: None,
            released: false,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn kind(&self) -> CaptureKind {
        self.kind
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.timer.elapsed_secs()
    }

    /// Transition into a terminal state and release resources. Release runs
    /// exactly once per session regardless of which exit path got here.
    pub(crate) fn enter_terminal(&mut self, state: SessionState) {
        debug_assert!(state.is_terminal());
        self.state = state;
        self.release_resources();
    }

    fn release_resources(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if let Some(recorder) = &mut self.recorder {
            // Aborting after a clean stop is a no-op; on every other path
            // it stops the stream's tracks and discards chunks.
            recorder.abort();
        }
        self.timer.cancel();
        self.tracker.reset();

        info!("session {} resources released ({})", self.id, self.state.name());
    }
}
