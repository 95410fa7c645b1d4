use serde::{Deserialize, Serialize};

use crate::error::CaptureError;

/// The capture modality of a session.
///
/// Determines which device-stream request (if any) is made and which output
/// encoding the artifact carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureKind {
    /// Rectangular region of the visible surface, encoded as a still image.
    StillImage,
    /// The active display, recorded as a video clip.
    ScreenVideo,
    /// Microphone input, recorded as a voice clip.
    VoiceAudio,
}

impl CaptureKind {
    /// Whether this modality acquires a live device stream. Still-image
    /// capture rasterizes synchronously at commit instead.
    pub fn needs_stream(self) -> bool {
        !matches!(self, CaptureKind::StillImage)
    }
}

/// A live, revocable handle to a device-provided media source.
///
/// The owning recorder drains encoded bytes periodically via `read_chunk`.
/// The platform may end the stream at any time (the user revoking sharing
/// through a control outside this widget); `has_ended` reports that.
pub trait MediaStream: Send {
    /// Drain whatever encoded bytes accumulated since the last read.
    /// Returns an empty vec when nothing is buffered.
    fn read_chunk(&mut self) -> Vec<u8>;

    /// Whether the platform ended this stream outside our control.
    fn has_ended(&self) -> bool;

    /// Stop the underlying device tracks. Idempotent; a leaked track is a
    /// correctness bug, so every session exit path calls this.
    fn stop_tracks(&mut self);

    /// Content type of the bytes this stream emits.
    fn mime_type(&self) -> &str;
}

/// Host capability that prompts for and yields live media streams.
#[async_trait::async_trait]
pub trait DeviceStreamProvider: Send + Sync {
    /// Request a stream for the given modality.
    ///
    /// Resolves once the user grants access; fails with
    /// `CaptureError::Permission` if the user denies or the platform blocks
    /// the device. The platform may reject at any time while the request is
    /// pending.
    async fn request_stream(&self, kind: CaptureKind)
        -> Result<Box<dyn MediaStream>, CaptureError>;
}
