//! Geometry: points, rectangles, and the pointer-to-image-space transform.
//!
//! Every coordinate that reaches the state machine or the renderer is in
//! image pixel space. The canvas element is usually displayed at a different
//! size than its backing store (CSS scaling), so pointer positions are scaled
//! by `backing / displayed` on each axis before use.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DELETE_AFFORDANCE_PX, MIN_BOX_SIZE_PX};

/// A point in either client (CSS pixel) or image pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in image pixel space, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A region of interest drawn by the user. Same shape as [`Rect`].
pub type BoundingBox = Rect;

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Normalized rectangle spanning two corner points, in any drag direction.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Right edge (`x + width`).
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (`y + height`).
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Inclusive containment: points on any edge count as inside.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.right() && pt.y >= self.y && pt.y <= self.bottom()
    }

    /// Whether both sides reach [`MIN_BOX_SIZE_PX`].
    #[must_use]
    pub fn meets_min_size(&self) -> bool {
        self.width >= MIN_BOX_SIZE_PX && self.height >= MIN_BOX_SIZE_PX
    }
}

/// Inclusive point-in-box test.
#[must_use]
pub fn contains_point(bbox: &BoundingBox, pt: Point) -> bool {
    bbox.contains(pt)
}

/// The square delete affordance whose top-right corner sits on the box's top-right corner.
#[must_use]
pub fn delete_affordance_rect(bbox: &BoundingBox) -> Rect {
    Rect {
        x: bbox.right() - DELETE_AFFORDANCE_PX,
        y: bbox.y,
        width: DELETE_AFFORDANCE_PX,
        height: DELETE_AFFORDANCE_PX,
    }
}

/// Where the canvas element sits on screen, as reported by `getBoundingClientRect`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementBounds {
    pub left: f64,
    pub top: f64,
    /// Displayed (CSS) width.
    pub width: f64,
    /// Displayed (CSS) height.
    pub height: f64,
}

/// Raw pointer sample in client coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerInput {
    /// Mouse or pen event carrying a client position.
    Mouse(Point),
    /// Touch event carrying the currently active touch points. Empty on a final touch-end.
    Touch(Vec<Point>),
}

impl PointerInput {
    /// The client position this event resolves to, if any.
    #[must_use]
    pub fn client_point(&self) -> Option<Point> {
        match self {
            Self::Mouse(pt) => Some(*pt),
            Self::Touch(touches) => touches.first().copied(),
        }
    }
}

/// Convert a pointer event to image pixel coordinates.
///
/// `pixel_size` is the canvas backing size (which equals the image's natural
/// size once an image is drawn). Returns `None` when the event has no
/// resolvable position or the element is not laid out.
#[must_use]
pub fn to_image_space(input: &PointerInput, bounds: &ElementBounds, pixel_size: Size) -> Option<Point> {
    let client = input.client_point()?;
    if bounds.width <= 0.0 || bounds.height <= 0.0 {
        return None;
    }
    let scale_x = pixel_size.width / bounds.width;
    let scale_y = pixel_size.height / bounds.height;
    Some(Point {
        x: (client.x - bounds.left) * scale_x,
        y: (client.y - bounds.top) * scale_y,
    })
}
