//! Capture session management
//!
//! This module provides the session aggregate and the
//! `CaptureSessionController` that orchestrates one capture session
//! end-to-end per modality:
//! - device-stream acquisition through the injected provider
//! - region-selection geometry for still images
//! - recorder + timer lock-step for video/audio
//! - unconditional resource release on every exit path

mod controller;
mod session;
mod snapshot;

pub use controller::CaptureSessionController;
pub use session::{CaptureSession, SessionId, SessionState};
pub use snapshot::SessionSnapshot;
