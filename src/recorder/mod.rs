//! Chunked recording
//!
//! Wraps a live media stream into a start/pause/resume/stop primitive that
//! drains encoded chunks at a bounded interval and assembles the final
//! artifact on stop.

mod artifact;
mod chunk;

pub use artifact::MediaArtifact;
pub use chunk::{ChunkRecorder, RecorderState};
