// Shared test doubles for the capture subsystem.
//
// The ledger counts device acquisitions against track releases so tests can
// assert that every exit path reaches parity (no leaked streams).
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use mediacap::{
    CaptureError, CaptureKind, DeviceStreamProvider, MediaStream, PixelSnapshot, SurfaceRasterizer,
};

/// Acquire/release counters shared between a provider and its streams.
#[derive(Default)]
pub struct ResourceLedger {
    pub acquired: AtomicUsize,
    pub released: AtomicUsize,
}

impl ResourceLedger {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn balanced(&self) -> bool {
        self.acquired() == self.released()
    }
}

/// Stream that emits one sequence-numbered byte per read.
pub struct ScriptedStream {
    ledger: Arc<ResourceLedger>,
    ended: Arc<AtomicBool>,
    next_seq: u8,
    stopped: bool,
    mime: &'static str,
}

impl ScriptedStream {
    pub fn new(ledger: Arc<ResourceLedger>, ended: Arc<AtomicBool>, mime: &'static str) -> Self {
        ledger.acquired.fetch_add(1, Ordering::SeqCst);
        Self {
            ledger,
            ended,
            next_seq: 0,
            stopped: false,
            mime,
        }
    }
}

impl MediaStream for ScriptedStream {
    fn read_chunk(&mut self) -> Vec<u8> {
        let seq = self.next_seq;
        self.next_seq += 1;
        vec![seq]
    }

    fn has_ended(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }

    fn stop_tracks(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.ledger.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn mime_type(&self) -> &str {
        self.mime
    }
}

/// Provider double that either grants `ScriptedStream`s or denies access.
pub struct MockProvider {
    pub ledger: Arc<ResourceLedger>,
    /// Flips the platform-side "sharing revoked" signal on granted streams.
    pub ended: Arc<AtomicBool>,
    deny: bool,
}

impl MockProvider {
    pub fn granting() -> Self {
        Self {
            ledger: Arc::new(ResourceLedger::default()),
            ended: Arc::new(AtomicBool::new(false)),
            deny: false,
        }
    }

    pub fn denying() -> Self {
        Self {
            ledger: Arc::new(ResourceLedger::default()),
            ended: Arc::new(AtomicBool::new(false)),
            deny: true,
        }
    }

    pub fn revoke_sharing(&self) {
        self.ended.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl DeviceStreamProvider for MockProvider {
    async fn request_stream(
        &self,
        kind: CaptureKind,
    ) -> Result<Box<dyn MediaStream>, CaptureError> {
        if self.deny {
            return Err(CaptureError::Permission(
                "user dismissed the permission prompt".to_string(),
            ));
        }

        let mime = match kind {
            CaptureKind::ScreenVideo => "video/webm",
            CaptureKind::VoiceAudio => "audio/webm",
            CaptureKind::StillImage => {
                return Err(CaptureError::Permission(
                    "still image capture does not use a device stream".to_string(),
                ))
            }
        };

        Ok(Box::new(ScriptedStream::new(
            Arc::clone(&self.ledger),
            Arc::clone(&self.ended),
            mime,
        )))
    }
}

/// Rasterizer double returning a fixed-size solid snapshot.
pub struct MockRasterizer {
    pub width: u32,
    pub height: u32,
}

impl MockRasterizer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[async_trait::async_trait]
impl SurfaceRasterizer for MockRasterizer {
    async fn rasterize(&self) -> Result<PixelSnapshot, CaptureError> {
        Ok(PixelSnapshot::solid(
            self.width,
            self.height,
            [128, 128, 128, 255],
        ))
    }
}
