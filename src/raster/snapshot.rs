use image::RgbaImage;

/// A full-surface pixel snapshot at 1:1 scale.
#[derive(Debug, Clone)]
pub struct PixelSnapshot {
    image: RgbaImage,
}

impl PixelSnapshot {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Snapshot filled with a single color, mainly useful for tests and
    /// headless rasterizer implementations.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, image::Rgba(rgba)),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}
