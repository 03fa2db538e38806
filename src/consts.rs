//! Shared numeric and style constants for the canvas controller.

// ── Geometry ────────────────────────────────────────────────────

/// Minimum width and height, in image pixels, for a drawn box to be kept.
pub const MIN_BOX_SIZE_PX: f64 = 10.0;

/// Side length of the square delete affordance, in image pixels.
pub const DELETE_AFFORDANCE_PX: f64 = 24.0;

// ── Surface ─────────────────────────────────────────────────────

/// Backing size used before any image has been drawn (the HTML canvas default).
pub const DEFAULT_SURFACE_WIDTH: u32 = 300;
/// See [`DEFAULT_SURFACE_WIDTH`].
pub const DEFAULT_SURFACE_HEIGHT: u32 = 150;

// ── Strokes ─────────────────────────────────────────────────────

/// Stroke width for committed annotations.
pub const ANNOTATION_STROKE_PX: f64 = 4.0;
/// Opacity for committed annotation strokes.
pub const ANNOTATION_STROKE_ALPHA: f64 = 0.8;
/// Stroke width for the hovered annotation.
pub const HOVER_STROKE_PX: f64 = 6.0;
/// Accent color for the hovered annotation.
pub const HOVER_STROKE_COLOR: &str = "#ffd400";
/// Stroke width for the in-progress box.
pub const PENDING_STROKE_PX: f64 = 3.0;
/// Stroke color for the in-progress box.
pub const PENDING_STROKE_COLOR: &str = "#00f6d2";
/// Dash pattern (on, off) for the in-progress box.
pub const PENDING_DASH: [f64; 2] = [5.0, 5.0];

// ── Label tags ──────────────────────────────────────────────────

/// Font size of label tag text.
pub const TAG_FONT_PX: f64 = 14.0;
/// Approximate advance per character used to size label tags.
pub const TAG_CHAR_ADVANCE_PX: f64 = 8.0;
/// Horizontal padding inside a label tag.
pub const TAG_PADDING_PX: f64 = 4.0;
/// Height of a label tag.
pub const TAG_HEIGHT_PX: f64 = 20.0;
/// Label tag text color.
pub const TAG_TEXT_COLOR: &str = "#1a1d21";

// ── Delete glyph ────────────────────────────────────────────────

/// Fill behind the delete cross.
pub const DELETE_GLYPH_FILL: &str = "#e74c3c";
/// Color of the delete cross strokes.
pub const DELETE_GLYPH_STROKE: &str = "#ffffff";
/// Inset of the cross from the affordance edges.
pub const DELETE_GLYPH_INSET_PX: f64 = 6.0;
/// Width of the cross strokes.
pub const DELETE_GLYPH_STROKE_PX: f64 = 2.0;

// ── Error placeholder ───────────────────────────────────────────

/// Message drawn when the image cannot be loaded.
pub const IMAGE_ERROR_TEXT: &str = "Could not load image.";
/// Color of the error placeholder text.
pub const IMAGE_ERROR_COLOR: &str = "#e0e0e0";
/// Font of the error placeholder text.
pub const IMAGE_ERROR_FONT: &str = "16px Inter, sans-serif";
