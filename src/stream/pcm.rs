use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::warn;

use super::provider::MediaStream;

/// Shared state between the stream handle and its platform-side feed.
struct PcmShared {
    buffer: Mutex<Vec<u8>>,
    ended: AtomicBool,
}

/// In-process `MediaStream` fed with interleaved i16 PCM frames.
///
/// Platform glue pushes frames through the paired [`PcmFeed`]; samples are
/// encoded little-endian into the chunk buffer, so concatenating the
/// emitted chunks yields a contiguous raw PCM clip.
pub struct PcmAudioStream {
    shared: Arc<PcmShared>,
    mime: String,
}

impl PcmAudioStream {
    /// Create a stream and the feed handle the capture callback pushes
    /// frames into.
    pub fn new(sample_rate: u32, channels: u16) -> (Self, PcmFeed) {
        let shared = Arc::new(PcmShared {
            buffer: Mutex::new(Vec::new()),
            ended: AtomicBool::new(false),
        });

        let stream = Self {
            shared: Arc::clone(&shared),
            mime: format!("audio/pcm;rate={};channels={}", sample_rate, channels),
        };

        (stream, PcmFeed { shared })
    }
}

impl MediaStream for PcmAudioStream {
    fn read_chunk(&mut self) -> Vec<u8> {
        let mut buffer = self.shared.buffer.lock().unwrap();
        std::mem::take(&mut *buffer)
    }

    fn has_ended(&self) -> bool {
        self.shared.ended.load(Ordering::SeqCst)
    }

    fn stop_tracks(&mut self) {
        self.shared.ended.store(true, Ordering::SeqCst);
    }

    fn mime_type(&self) -> &str {
        &self.mime
    }
}

/// Push side of a [`PcmAudioStream`], handed to the platform capture
/// callback.
#[derive(Clone)]
pub struct PcmFeed {
    shared: Arc<PcmShared>,
}

impl PcmFeed {
    /// Append a frame of interleaved i16 samples. Frames pushed after the
    /// stream ended are dropped.
    pub fn push_frame(&self, samples: &[i16]) {
        if self.shared.ended.load(Ordering::SeqCst) {
            warn!("dropping {} samples pushed after stream end", samples.len());
            return;
        }

        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        self.shared.buffer.lock().unwrap().extend_from_slice(&bytes);
    }

    /// Mark the stream as ended by the platform (e.g. device unplugged or
    /// sharing revoked).
    pub fn close(&self) {
        self.shared.ended.store(true, Ordering::SeqCst);
    }

    /// Whether the stream has ended; capture loops use this to stop
    /// producing frames.
    pub fn is_closed(&self) -> bool {
        self.shared.ended.load(Ordering::SeqCst)
    }
}
