use super::rect::{Point, SelectionRect};

/// Turns a sequence of pointer samples into a normalized selection rect.
///
/// `begin` records the drag anchor, `update` returns the rect spanning the
/// anchor and the current pointer, `end` finalizes and reports whether the
/// rect clears the minimum-dimension threshold. No side effects beyond the
/// returned values.
#[derive(Debug)]
pub struct GeometryTracker {
    anchor: Option<Point>,
    current: Option<SelectionRect>,
    min_dim: f64,
}

impl GeometryTracker {
    pub fn new(min_dim: f64) -> Self {
        Self {
            anchor: None,
            current: None,
            min_dim,
        }
    }

    /// Record the drag anchor, discarding any in-progress rect.
    pub fn begin(&mut self, point: Point) {
        self.anchor = Some(point);
        self.current = Some(SelectionRect::at(point));
    }

    /// Update the drag with a new pointer sample. A sample arriving without
    /// a prior `begin` re-anchors at the given point.
    pub fn update(&mut self, point: Point) -> SelectionRect {
        let anchor = match self.anchor {
            Some(anchor) => anchor,
            None => {
                self.anchor = Some(point);
                point
            }
        };

        let rect = SelectionRect::from_corners(anchor, point);
        self.current = Some(rect);
        rect
    }

    /// Finalize the drag. Returns the resulting rect and whether it is
    /// usable. A single point with no movement yields a zero-area rect,
    /// never usable.
    pub fn end(&mut self, point: Point) -> (SelectionRect, bool) {
        let rect = self.update(point);
        self.anchor = None;
        (rect, rect.is_usable(self.min_dim))
    }

    /// Rect of the most recent drag, if any.
    pub fn current_rect(&self) -> Option<SelectionRect> {
        self.current
    }

    /// Whether the current rect clears the usability threshold.
    pub fn has_usable_rect(&self) -> bool {
        self.current
            .map(|rect| rect.is_usable(self.min_dim))
            .unwrap_or(false)
    }

    /// Discard the anchor and any in-progress rect.
    pub fn reset(&mut self) {
        self.anchor = None;
        self.current = None;
    }
}
