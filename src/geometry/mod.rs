//! Region-selection geometry
//!
//! Pure pointer-to-rectangle logic for the still-image flow. No device or
//! async dependency; everything here is a function of its inputs.

mod rect;
mod tracker;

pub use rect::{Point, SelectionRect};
pub use tracker::GeometryTracker;
