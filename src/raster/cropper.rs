use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;

use super::snapshot::PixelSnapshot;
use crate::error::CaptureError;
use crate::geometry::SelectionRect;

/// MIME type of encoded still-image artifacts.
pub const PNG_MIME: &str = "image/png";

/// Pure crop-and-encode over a pixel snapshot.
pub struct Cropper;

impl Cropper {
    /// Extract the sub-region described by `rect`.
    ///
    /// Fails with `InvalidRegion` if the rect lies even partially outside
    /// the snapshot bounds; callers that want clamping must clamp before
    /// calling.
    pub fn crop(snapshot: &PixelSnapshot, rect: &SelectionRect) -> Result<RgbaImage, CaptureError> {
        let (x, y, width, height) = rect.to_pixels();

        if width == 0 || height == 0 {
            return Err(CaptureError::InvalidRegion(
                "crop rectangle has zero width or height".to_string(),
            ));
        }

        let (snap_w, snap_h) = (snapshot.width(), snapshot.height());
        // Compare in u64: x + width can exceed u32::MAX for far-offscreen
        // rects and must not wrap.
        if u64::from(x) + u64::from(width) > u64::from(snap_w)
            || u64::from(y) + u64::from(height) > u64::from(snap_h)
        {
            return Err(CaptureError::InvalidRegion(format!(
                "crop rectangle ({},{},{},{}) exceeds snapshot bounds {}x{}",
                x, y, width, height, snap_w, snap_h
            )));
        }

        let cropped = DynamicImage::ImageRgba8(snapshot.image().clone())
            .crop_imm(x, y, width, height)
            .to_rgba8();

        Ok(cropped)
    }

    /// Encode a pixel buffer to PNG bytes. Deterministic for identical
    /// input.
    pub fn encode_png(buffer: &RgbaImage) -> Result<Vec<u8>, CaptureError> {
        let mut png_bytes: Vec<u8> = Vec::new();
        DynamicImage::ImageRgba8(buffer.clone())
            .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
            .map_err(|e| CaptureError::Encode(e.to_string()))?;

        Ok(png_bytes)
    }
}
