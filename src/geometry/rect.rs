use serde::{Deserialize, Serialize};

/// A pointer position in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A normalized screen-space rectangle.
///
/// `width` and `height` are always non-negative regardless of which corner
/// the drag started from; construction swaps corners as needed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SelectionRect {
    /// Zero-area rect anchored at a single point.
    pub fn at(point: Point) -> Self {
        Self {
            x: point.x,
            y: point.y,
            width: 0.0,
            height: 0.0,
        }
    }

    /// Normalized rect spanning two arbitrary corner points.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    /// Whether the rect is large enough to capture. Sub-threshold rects are
    /// geometrically valid but rejected at the capture boundary.
    pub fn is_usable(&self, min_dim: f64) -> bool {
        self.width > min_dim && self.height > min_dim
    }

    /// Integer pixel bounds for cropping: (x, y, width, height).
    pub fn to_pixels(&self) -> (u32, u32, u32, u32) {
        (
            self.x.round().max(0.0) as u32,
            self.y.round().max(0.0) as u32,
            self.width.round() as u32,
            self.height.round() as u32,
        )
    }
}
