use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::session::{CaptureSession, SessionId, SessionState};
use super::snapshot::SessionSnapshot;
use crate::config::CaptureConfig;
use crate::error::CaptureError;
use crate::geometry::{Point, SelectionRect};
use crate::raster::{Cropper, SurfaceRasterizer, PNG_MIME};
use crate::recorder::{ChunkRecorder, MediaArtifact};
use crate::stream::{CaptureKind, DeviceStreamProvider};
use crate::timer::TickScheduler;

/// Orchestrates capture sessions end-to-end.
///
/// The controller is the only component that acquires or releases media
/// resources. At most one session per [`CaptureKind`] may be in a
/// non-terminal state; further starts are rejected with
/// `SessionInProgress`.
pub struct CaptureSessionController {
    provider: Arc<dyn DeviceStreamProvider>,
    rasterizer: Arc<dyn SurfaceRasterizer>,
    scheduler: Arc<dyn TickScheduler>,
    config: CaptureConfig,
    sessions: HashMap<SessionId, CaptureSession>,
}

impl CaptureSessionController {
    pub fn new(
        provider: Arc<dyn DeviceStreamProvider>,
        rasterizer: Arc<dyn SurfaceRasterizer>,
        scheduler: Arc<dyn TickScheduler>,
        config: CaptureConfig,
    ) -> Self {
        Self {
            provider,
            rasterizer,
            scheduler,
            config,
            sessions: HashMap::new(),
        }
    }

    /// Begin a capture session of the given kind.
    ///
    /// Still-image sessions enter `Selecting` immediately. Video/audio
    /// sessions acquire a device stream; on success the recorder and timer
    /// start together and the session is `Active`. A provider denial leaves
    /// the session queryable in `Failed` and returns the `Permission`
    /// error; nothing is held in that case.
    pub async fn start_session(&mut self, kind: CaptureKind) -> Result<SessionId, CaptureError> {
        if let Some(existing) = self
            .sessions
            .values()
            .find(|s| s.kind == kind && !s.state.is_terminal())
        {
            warn!(
                "rejecting {:?} start: session {} is {}",
                kind,
                existing.id,
                existing.state.name()
            );
            return Err(CaptureError::SessionInProgress(kind));
        }

        // Terminal sessions of this kind have served their purpose once a
        // new one begins; drop them so the registry stays bounded.
        self.sessions
            .retain(|_, s| s.kind != kind || !s.state.is_terminal());

        if !kind.needs_stream() {
            let session = CaptureSession::new(
                kind,
                SessionState::Selecting,
                self.config.min_selection_dim,
            );
            let id = session.id;
            info!("session {} started: region selection open", id);
            self.sessions.insert(id, session);
            return Ok(id);
        }

        let mut session = CaptureSession::new(
            kind,
            SessionState::Requesting,
            self.config.min_selection_dim,
        );
        let id = session.id;
        info!("session {} requesting {:?} stream", id, kind);

        match self.provider.request_stream(kind).await {
            Ok(stream) => {
                let mut recorder =
                    ChunkRecorder::new(kind, Duration::from_millis(self.config.chunk_slice_ms));
                if let Err(e) = recorder.start(stream, self.scheduler.as_ref()) {
                    session.last_error = Some(e.clone());
                    session.enter_terminal(SessionState::Failed);
                    self.sessions.insert(id, session);
                    return Err(e);
                }

                session.recorder = Some(recorder);
                session.timer.start(
                    self.scheduler.as_ref(),
                    Duration::from_millis(self.config.timer_tick_ms),
                );
                session.state = SessionState::Active;
                info!("session {} active", id);
                self.sessions.insert(id, session);
                Ok(id)
            }
            Err(e) => {
                warn!("session {} stream request failed: {}", id, e);
                session.last_error = Some(e.clone());
                session.enter_terminal(SessionState::Failed);
                self.sessions.insert(id, session);
                Err(e)
            }
        }
    }

    /// Anchor the selection drag. Still-image sessions in `Selecting` only.
    pub fn begin_selection(&mut self, id: SessionId, point: Point) -> Result<(), CaptureError> {
        let session = self.selecting_session_mut(id, "begin_selection")?;
        session.tracker.begin(point);
        Ok(())
    }

    /// Extend the selection drag with a new pointer sample.
    pub fn update_selection(
        &mut self,
        id: SessionId,
        point: Point,
    ) -> Result<SelectionRect, CaptureError> {
        let session = self.selecting_session_mut(id, "update_selection")?;
        Ok(session.tracker.update(point))
    }

    /// Finish the selection drag; reports whether the rect is usable.
    pub fn end_selection(&mut self, id: SessionId, point: Point) -> Result<bool, CaptureError> {
        let session = self.selecting_session_mut(id, "end_selection")?;
        let (_, usable) = session.tracker.end(point);
        Ok(usable)
    }

    /// Commit the current selection: rasterize the visible surface, crop to
    /// the rect and encode a PNG artifact.
    ///
    /// Requires a usable rect (`InvalidRegion` otherwise). An out-of-bounds
    /// crop also returns `InvalidRegion` and the session stays in
    /// `Selecting` for another attempt; rasterizer and encoder failures are
    /// terminal.
    pub async fn commit_selection(
        &mut self,
        id: SessionId,
    ) -> Result<MediaArtifact, CaptureError> {
        let rect = {
            let session = self.selecting_session_mut(id, "commit_selection")?;
            let rect = session
                .tracker
                .current_rect()
                .ok_or_else(|| CaptureError::InvalidRegion("no selection made".to_string()))?;
            if !session.tracker.has_usable_rect() {
                return Err(CaptureError::InvalidRegion(format!(
                    "selection {:.0}x{:.0} is below the minimum size",
                    rect.width, rect.height
                )));
            }
            session.state = SessionState::Finalizing;
            rect
        };

        // The rasterizer hides the overlay chrome and waits out a paint
        // cycle before grabbing pixels.
        let snapshot = match self.rasterizer.rasterize().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                let session = self.session_mut(id)?;
                session.last_error = Some(e.clone());
                session.enter_terminal(SessionState::Failed);
                return Err(e);
            }
        };

        let session = self.session_mut(id)?;
        let buffer = match Cropper::crop(&snapshot, &rect) {
            Ok(buffer) => buffer,
            Err(e @ CaptureError::InvalidRegion(_)) => {
                // Recoverable: reopen the selection for retry.
                session.state = SessionState::Selecting;
                return Err(e);
            }
            Err(e) => {
                session.last_error = Some(e.clone());
                session.enter_terminal(SessionState::Failed);
                return Err(e);
            }
        };

        let bytes = match Cropper::encode_png(&buffer) {
            Ok(bytes) => bytes,
            Err(e) => {
                session.last_error = Some(e.clone());
                session.enter_terminal(SessionState::Failed);
                return Err(e);
            }
        };

        let artifact = MediaArtifact::new(bytes, PNG_MIME, CaptureKind::StillImage);
        session.artifact = Some(artifact.clone());
        session.enter_terminal(SessionState::Completed);
        info!("session {} completed: {} byte still image", id, artifact.len());
        Ok(artifact)
    }

    /// Pause recording. Recorder first, timer second, so a rejected
    /// transition leaves the elapsed counter untouched.
    pub fn pause(&mut self, id: SessionId) -> Result<(), CaptureError> {
        if self.absorb_external_end(id)? {
            return Err(CaptureError::StreamEndedExternally);
        }

        let session = self.session_mut(id)?;
        match session.state {
            SessionState::Active => {
                session
                    .recorder
                    .as_mut()
                    .ok_or(CaptureError::InvalidTransition {
                        from: "active",
                        requested: "pause",
                    })?
                    .pause()?;
                session.timer.pause();
                session.state = SessionState::ActivePaused;
                info!("session {} paused", id);
                Ok(())
            }
            state => Err(CaptureError::InvalidTransition {
                from: state.name(),
                requested: "pause",
            }),
        }
    }

    /// Resume a paused recording, recorder and timer in lock-step.
    pub fn resume(&mut self, id: SessionId) -> Result<(), CaptureError> {
        if self.absorb_external_end(id)? {
            return Err(CaptureError::StreamEndedExternally);
        }

        let session = self.session_mut(id)?;
        match session.state {
            SessionState::ActivePaused => {
                session
                    .recorder
                    .as_mut()
                    .ok_or(CaptureError::InvalidTransition {
                        from: "active_paused",
                        requested: "resume",
                    })?
                    .resume()?;
                session.timer.resume();
                session.state = SessionState::Active;
                info!("session {} resumed", id);
                Ok(())
            }
            state => Err(CaptureError::InvalidTransition {
                from: state.name(),
                requested: "resume",
            }),
        }
    }

    /// Stop recording and return the assembled artifact.
    ///
    /// Idempotent once the session is `Completed`: the stored artifact is
    /// returned again. A stream that already ended externally finalizes the
    /// same way an explicit stop does.
    pub fn stop(&mut self, id: SessionId) -> Result<MediaArtifact, CaptureError> {
        self.absorb_external_end(id)?;

        let session = self.session_mut(id)?;
        match session.state {
            SessionState::Completed => {
                session
                    .artifact
                    .clone()
                    .ok_or(CaptureError::InvalidTransition {
                        from: "completed",
                        requested: "stop",
                    })
            }
            SessionState::Active | SessionState::ActivePaused => {
                session.state = SessionState::Finalizing;
                let recorder =
                    session
                        .recorder
                        .as_mut()
                        .ok_or(CaptureError::InvalidTransition {
                            from: "finalizing",
                            requested: "stop",
                        })?;
                match recorder.stop() {
                    Ok(artifact) => {
                        session.artifact = Some(artifact.clone());
                        session.enter_terminal(SessionState::Completed);
                        info!(
                            "session {} completed: {} byte {:?} recording",
                            id,
                            artifact.len(),
                            artifact.origin()
                        );
                        Ok(artifact)
                    }
                    Err(e) => {
                        session.last_error = Some(e.clone());
                        session.enter_terminal(SessionState::Failed);
                        Err(e)
                    }
                }
            }
            state => Err(CaptureError::InvalidTransition {
                from: state.name(),
                requested: "stop",
            }),
        }
    }

    /// Cancel a session. Valid from every non-terminal state, always
    /// succeeds, always releases resources; a no-op on terminal sessions.
    pub fn cancel(&mut self, id: SessionId) -> Result<(), CaptureError> {
        let session = self.session_mut(id)?;
        if session.state.is_terminal() {
            return Ok(());
        }

        info!("session {} cancelled from {}", id, session.state.name());
        session.enter_terminal(SessionState::Cancelled);
        Ok(())
    }

    /// Absorb platform-side stream revocation, then report the current
    /// state. Hosts call this from their update loop so an externally ended
    /// stream finalizes promptly even if the user never presses stop.
    pub fn poll(&mut self, id: SessionId) -> Result<SessionState, CaptureError> {
        self.absorb_external_end(id)?;
        Ok(self.session(id)?.state)
    }

    /// Observable state for UI binding.
    pub fn session_snapshot(&self, id: SessionId) -> Result<SessionSnapshot, CaptureError> {
        Ok(SessionSnapshot::of(self.session(id)?))
    }

    /// Most recent session of a kind, terminal ones included. Lets the host
    /// render the failure of a start whose error was returned without an id.
    pub fn session_of_kind(&self, kind: CaptureKind) -> Option<SessionId> {
        self.sessions
            .values()
            .filter(|s| s.kind == kind)
            .max_by_key(|s| s.started_at)
            .map(|s| s.id)
    }

    /// Drop a finished session from the registry. Live sessions must be
    /// cancelled or stopped first.
    pub fn remove_session(&mut self, id: SessionId) -> Result<(), CaptureError> {
        let session = self.session(id)?;
        if !session.state.is_terminal() {
            return Err(CaptureError::InvalidTransition {
                from: session.state.name(),
                requested: "remove",
            });
        }
        self.sessions.remove(&id);
        Ok(())
    }

    /// Typed error of a failed session, if any.
    pub fn last_error(&self, id: SessionId) -> Result<Option<CaptureError>, CaptureError> {
        Ok(self.session(id)?.last_error.clone())
    }

    /// Forced host teardown (e.g. the widget is closing): cancel every
    /// non-terminal session and release all acquired resources.
    pub fn shutdown(&mut self) {
        for session in self.sessions.values_mut() {
            if !session.state.is_terminal() {
                info!("shutdown: cancelling session {}", session.id);
                session.enter_terminal(SessionState::Cancelled);
            }
        }
    }

    /// Finalize with partial data if the platform revoked the stream.
    /// Returns whether a finalization happened.
    fn absorb_external_end(&mut self, id: SessionId) -> Result<bool, CaptureError> {
        let session = self.session_mut(id)?;

        let ended = matches!(
            session.state,
            SessionState::Active | SessionState::ActivePaused
        ) && session
            .recorder
            .as_ref()
            .map(|r| r.stream_ended())
            .unwrap_or(false);

        if !ended {
            return Ok(false);
        }

        warn!(
            "session {} stream ended externally; finalizing partial recording",
            id
        );
        session.state = SessionState::Finalizing;
        let recorder = session
            .recorder
            .as_mut()
            .ok_or(CaptureError::InvalidTransition {
                from: "finalizing",
                requested: "stop",
            })?;
        match recorder.stop() {
            Ok(artifact) => {
                session.artifact = Some(artifact);
                session.enter_terminal(SessionState::Completed);
                Ok(true)
            }
            Err(e) => {
                session.last_error = Some(e.clone());
                session.enter_terminal(SessionState::Failed);
                Err(e)
            }
        }
    }

    fn session(&self, id: SessionId) -> Result<&CaptureSession, CaptureError> {
        self.sessions
            .get(&id)
            .ok_or(CaptureError::UnknownSession(id))
    }

    fn session_mut(&mut self, id: SessionId) -> Result<&mut CaptureSession, CaptureError> {
        self.sessions
            .get_mut(&id)
            .ok_or(CaptureError::UnknownSession(id))
    }

    fn selecting_session_mut(
        &mut self,
        id: SessionId,
        requested: &'static str,
    ) -> Result<&mut CaptureSession, CaptureError> {
        let session = self.session_mut(id)?;
        if session.kind != CaptureKind::StillImage || session.state != SessionState::Selecting {
            return Err(CaptureError::InvalidTransition {
                from: session.state.name(),
                requested,
            });
        }
        Ok(session)
    }
}
