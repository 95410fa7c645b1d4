pub mod config;
pub mod error;
pub mod geometry;
pub mod raster;
pub mod recorder;
pub mod session;
pub mod stream;
pub mod timer;

pub use config::CaptureConfig;
pub use error::CaptureError;
pub use geometry::{GeometryTracker, Point, SelectionRect};
pub use raster::{Cropper, PixelSnapshot, SurfaceRasterizer};
pub use recorder::{ChunkRecorder, MediaArtifact, RecorderState};
pub use session::{CaptureSession, CaptureSessionController, SessionId, SessionSnapshot, SessionState};
pub use stream::{CaptureKind, DeviceStreamProvider, MediaStream, PcmAudioStream, PcmFeed};
pub use timer::{ManualTickScheduler, SessionTimer, TickHandle, TickScheduler, TokioTickScheduler};
