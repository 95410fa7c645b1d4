use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

use super::artifact::MediaArtifact;
use crate::error::CaptureError;
use crate::stream::{CaptureKind, MediaStream};
use crate::timer::{TickHandle, TickScheduler};

/// Recorder lifecycle: `Idle -> Recording <-> Paused -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
    Paused,
    Stopped,
}

impl RecorderState {
    fn name(self) -> &'static str {
        match self {
            RecorderState::Idle => "idle",
            RecorderState::Recording => "recording",
            RecorderState::Paused => "paused",
            RecorderState::Stopped => "stopped",
        }
    }
}

/// State shared with the chunk-drain tick callback.
struct RecorderShared {
    stream: Mutex<Box<dyn MediaStream>>,
    chunks: Mutex<Vec<Vec<u8>>>,
    gathering: AtomicBool,
    ended: AtomicBool,
}

impl RecorderShared {
    /// Drain whatever the stream buffered and latch platform-level end.
    fn drain_once(&self) {
        let mut stream = self.stream.lock().unwrap();

        let chunk = stream.read_chunk();
        if !chunk.is_empty() {
            self.chunks.lock().unwrap().push(chunk);
        }

        if stream.has_ended() {
            self.ended.store(true, Ordering::SeqCst);
            self.gathering.store(false, Ordering::SeqCst);
        }
    }

    /// Drain and drop buffered bytes. Input produced while paused must not
    /// reach the artifact; revocation is still latched.
    fn discard_once(&self) {
        let mut stream = self.stream.lock().unwrap();
        let _ = stream.read_chunk();

        if stream.has_ended() {
            self.ended.store(true, Ordering::SeqCst);
        }
    }
}

/// Wraps a live media stream into a start/pause/resume/stop recording
/// primitive.
///
/// Chunks are drained at a bounded interval while recording and owned
/// exclusively by the recorder; no external actor may append. `stop` flushes
/// any buffered chunk, concatenates everything into one [`MediaArtifact`]
/// and is idempotent afterwards.
pub struct ChunkRecorder {
    origin: CaptureKind,
    chunk_interval: Duration,
    state: RecorderState,
    shared: Option<Arc<RecorderShared>>,
    tick: Option<TickHandle>,
    mime: String,
    artifact: Option<MediaArtifact>,
}

impl ChunkRecorder {
    pub fn new(origin: CaptureKind, chunk_interval: Duration) -> Self {
        Self {
            origin,
            chunk_interval,
            state: RecorderState::Idle,
            shared: None,
            tick: None,
            mime: String::new(),
            artifact: None,
        }
    }

    /// Take ownership of a live stream and begin draining chunks.
    ///
    /// Rejected with `AlreadyRecording` unless the recorder is `Idle`.
    pub fn start(
        &mut self,
        stream: Box<dyn MediaStream>,
        scheduler: &dyn TickScheduler,
    ) -> Result<(), CaptureError> {
        if self.state != RecorderState::Idle {
            return Err(CaptureError::AlreadyRecording);
        }

        self.mime = stream.mime_type().to_string();

        let shared = Arc::new(RecorderShared {
            stream: Mutex::new(stream),
            chunks: Mutex::new(Vec::new()),
            gathering: AtomicBool::new(true),
            ended: AtomicBool::new(false),
        });

        let tick_shared = Arc::clone(&shared);
        self.tick = Some(scheduler.schedule(
            self.chunk_interval,
            Box::new(move || {
                if tick_shared.gathering.load(Ordering::SeqCst) {
                    tick_shared.drain_once();
                } else {
                    // Pause-window input is dropped at the same cadence so
                    // it can never fold into the artifact later. Revocation
                    // is noticed on the same pass.
                    tick_shared.discard_once();
                }
            }),
        ));

        self.shared = Some(shared);
        self.state = RecorderState::Recording;

        info!("recorder started ({})", self.mime);
        Ok(())
    }

    /// Suspend chunk gathering. Only valid from `Recording`.
    ///
    /// The active-window tail still sitting in the stream buffer is flushed
    /// into the chunk list first; everything the stream produces after this
    /// point is discarded until `resume`.
    pub fn pause(&mut self) -> Result<(), CaptureError> {
        if self.state != RecorderState::Recording {
            return Err(CaptureError::InvalidTransition {
                from: self.state.name(),
                requested: "pause",
            });
        }

        if let Some(shared) = &self.shared {
            shared.drain_once();
            shared.gathering.store(false, Ordering::SeqCst);
        }
        self.state = RecorderState::Paused;
        Ok(())
    }

    /// Resume chunk gathering. Only valid from `Paused`.
    ///
    /// Any bytes buffered since the last paused drain belong to the pause
    /// window and are dropped before gathering restarts.
    pub fn resume(&mut self) -> Result<(), CaptureError> {
        if self.state != RecorderState::Paused {
            return Err(CaptureError::InvalidTransition {
                from: self.state.name(),
                requested: "resume",
            });
        }

        if let Some(shared) = &self.shared {
            shared.discard_once();
            shared.gathering.store(true, Ordering::SeqCst);
        }
        self.state = RecorderState::Recording;
        Ok(())
    }

    /// Stop recording and assemble the final artifact.
    ///
    /// Valid from `Recording` or `Paused`; performs one final synchronous
    /// drain so a stop issued right after start cannot drop the first
    /// chunk, stops the stream's tracks, and concatenates all chunks.
    /// When stopping from `Paused` the final drain is discarded instead of
    /// kept, since the active-window tail was already flushed at pause.
    /// Idempotent: a second call returns the same artifact without
    /// re-encoding.
    pub fn stop(&mut self) -> Result<MediaArtifact, CaptureError> {
        match self.state {
            RecorderState::Stopped => {
                return self
                    .artifact
                    .clone()
                    .ok_or(CaptureError::InvalidTransition {
                        from: "stopped",
                        requested: "stop",
                    });
            }
            RecorderState::Idle => {
                return Err(CaptureError::InvalidTransition {
                    from: "idle",
                    requested: "stop",
                });
            }
            RecorderState::Recording | RecorderState::Paused => {}
        }

        // Cancel the tick source before the final drain so no chunk can
        // append concurrently with assembly.
        if let Some(tick) = self.tick.take() {
            tick.cancel();
        }

        let shared = self.shared.take().ok_or(CaptureError::InvalidTransition {
            from: self.state.name(),
            requested: "stop",
        })?;

        {
            let from_paused = self.state == RecorderState::Paused;
            let mut stream = shared.stream.lock().unwrap();
            let last = stream.read_chunk();
            if !from_paused && !last.is_empty() {
                shared.chunks.lock().unwrap().push(last);
            }
            stream.stop_tracks();
        }

        let chunks = std::mem::take(&mut *shared.chunks.lock().unwrap());
        let chunk_count = chunks.len();
        let bytes: Vec<u8> = chunks.into_iter().flatten().collect();

        let artifact = MediaArtifact::new(bytes, self.mime.clone(), self.origin);
        self.artifact = Some(artifact.clone());
        self.state = RecorderState::Stopped;

        info!(
            "recorder stopped: {} chunks, {} bytes ({})",
            chunk_count,
            artifact.len(),
            self.mime
        );

        Ok(artifact)
    }

    /// Tear down without producing an artifact: cancel the tick source,
    /// stop the stream's tracks and discard accumulated chunks. Safe from
    /// any state, repeatedly.
    pub fn abort(&mut self) {
        if let Some(tick) = self.tick.take() {
            tick.cancel();
        }

        if let Some(shared) = self.shared.take() {
            shared.stream.lock().unwrap().stop_tracks();
            shared.chunks.lock().unwrap().clear();
            info!("recorder aborted, chunks discarded");
        }

        self.state = RecorderState::Stopped;
    }

    /// Whether the platform ended the stream outside this widget.
    pub fn stream_ended(&self) -> bool {
        self.shared
            .as_ref()
            .map(|shared| shared.ended.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn chunk_count(&self) -> usize {
        self.shared
            .as_ref()
            .map(|shared| shared.chunks.lock().unwrap().len())
            .unwrap_or(0)
    }
}
