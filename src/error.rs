use crate::stream::CaptureKind;
use uuid::Uuid;

/// Errors produced by the capture subsystem.
///
/// Every error is returned to the caller as a value; none of them are
/// retried internally. The host UI owns user-facing messaging.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    /// User denied or the platform blocked device access. Terminal for the
    /// session; not retried automatically.
    #[error("device access denied: {0}")]
    Permission(String),

    /// Commit attempted on a sub-threshold or out-of-bounds rect.
    /// Recoverable: the selection stays open for retry.
    #[error("selection rejected: {0}")]
    InvalidRegion(String),

    /// `start` called on a recorder that already holds a live stream.
    #[error("recorder already holds a live stream")]
    AlreadyRecording,

    /// Caller requested a transition the state machine does not allow.
    /// Reported rather than swallowed so the timer and recorder cannot
    /// silently desynchronize.
    #[error("invalid transition: {from} -> {requested}")]
    InvalidTransition {
        from: &'static str,
        requested: &'static str,
    },

    /// A session of this kind is already in progress; cancel or finish it
    /// first. Requests are rejected, never queued.
    #[error("a {0:?} session is already in progress")]
    SessionInProgress(CaptureKind),

    /// The platform revoked the stream outside this widget (e.g. the user
    /// ended sharing from a browser control). Treated as an implicit stop;
    /// whatever was accumulated is finalized.
    #[error("media stream ended externally")]
    StreamEndedExternally,

    /// No session with this id is known to the controller.
    #[error("unknown session: {0}")]
    UnknownSession(Uuid),

    /// The host's surface rasterizer failed.
    #[error("rasterize failed: {0}")]
    Rasterize(String),

    /// Image encoding failed.
    #[error("image encode failed: {0}")]
    Encode(String),
}
