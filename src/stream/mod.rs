//! Device stream capability boundary
//!
//! The host environment supplies live media streams (display video,
//! microphone audio); the subsystem only ever owns them through the
//! `MediaStream` handle and releases them through `stop_tracks`.

mod pcm;
mod provider;

pub use pcm::{PcmAudioStream, PcmFeed};
pub use provider::{CaptureKind, DeviceStreamProvider, MediaStream};
