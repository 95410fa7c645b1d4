use crate::stream::CaptureKind;

/// The immutable encoded output of a completed capture session.
///
/// Produced exactly once per successful session and never mutated after
/// creation; clones share nothing observable with the session that made it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaArtifact {
    bytes: Vec<u8>,
    mime_type: String,
    origin: CaptureKind,
}

impl MediaArtifact {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, origin: CaptureKind) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            origin,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn origin(&self) -> CaptureKind {
        self.origin
    }
}
