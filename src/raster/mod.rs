//! Surface rasterization and cropping
//!
//! The rasterizer is a host capability: it snapshots the visible UI at 1:1
//! scale. Cropping and encoding are pure functions over the snapshot.

mod cropper;
mod snapshot;

pub use cropper::{Cropper, PNG_MIME};
pub use snapshot::PixelSnapshot;

use crate::error::CaptureError;

/// Host capability that snapshots the full visible surface.
///
/// Implementations must hide any capture-tool-owned overlay chrome before
/// grabbing pixels (the tool must not capture itself) and allow one paint
/// cycle to settle, since the overlay hide is asynchronous with respect to
/// paint.
#[async_trait::async_trait]
pub trait SurfaceRasterizer: Send + Sync {
    async fn rasterize(&self) -> Result<PixelSnapshot, CaptureError>;
}
