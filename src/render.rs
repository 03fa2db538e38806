//! Rendering: composes the canvas scene into a deterministic display list.
//!
//! [`compose`] is a pure function of the image load state, the annotations,
//! the pending box, the hover target, and the labels. It produces a [`Frame`]
//! and never mutates its inputs. [`Frame::paint`] replays a frame onto any
//! [`Surface`]; the browser surface lives in `web.rs`.
//!
//! Layers, bottom first:
//! 1. the image at natural size (the surface is resized to match exactly),
//! 2. committed annotations in list order, with label tags and, for the
//!    hovered one, the delete glyph,
//! 3. the pending box, dashed.
//!
//! A failed image load skips layers 2 and 3 and draws a centered message.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::consts::{
    ANNOTATION_STROKE_ALPHA, ANNOTATION_STROKE_PX, DELETE_GLYPH_FILL, DELETE_GLYPH_INSET_PX, DELETE_GLYPH_STROKE,
    DELETE_GLYPH_STROKE_PX, HOVER_STROKE_COLOR, HOVER_STROKE_PX, IMAGE_ERROR_COLOR, IMAGE_ERROR_FONT,
    IMAGE_ERROR_TEXT, PENDING_DASH, PENDING_STROKE_COLOR, PENDING_STROKE_PX, TAG_CHAR_ADVANCE_PX, TAG_FONT_PX,
    TAG_HEIGHT_PX, TAG_PADDING_PX, TAG_TEXT_COLOR,
};
use crate::doc::{Annotation, AnnotationId, Label, LabelId, label_name};
use crate::geometry::{BoundingBox, Point, Rect, delete_affordance_rect};
use crate::image_load::{DecodedImage, ImageLoad};

/// Stroke parameters for outlines and lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    /// CSS color string.
    pub color: String,
    pub width: f64,
    /// Opacity in `0.0..=1.0`.
    pub alpha: f64,
    /// `[on, off]` dash lengths; solid when `None`.
    pub dash: Option<[f64; 2]>,
}

impl Stroke {
    fn solid(color: &str, width: f64) -> Self {
        Self { color: color.to_owned(), width, alpha: 1.0, dash: None }
    }
}

/// Horizontal text anchoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// Text appearance. Text is always vertically centered on its anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub color: String,
    /// CSS font shorthand.
    pub font: String,
    pub align: TextAlign,
}

/// One drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Blit the decoded image at the origin, unscaled.
    Image(DecodedImage),
    StrokeRect { rect: Rect, stroke: Stroke },
    FillRect { rect: Rect, color: String },
    Line { from: Point, to: Point, stroke: Stroke },
    Text { text: String, at: Point, style: TextStyle },
}

/// A complete, self-contained picture of the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Backing width in pixels.
    pub width: u32,
    /// Backing height in pixels.
    pub height: u32,
    pub ops: Vec<DrawOp>,
}

/// Everything a frame depends on.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub image: &'a ImageLoad,
    pub annotations: &'a [Annotation],
    pub pending_box: Option<BoundingBox>,
    pub hovered_id: Option<AnnotationId>,
    pub labels: &'a [Label],
    /// Surface size to keep when no decoded image dictates one.
    pub fallback_size: (u32, u32),
}

/// A drawing backend that frames can be replayed onto.
pub trait Surface {
    type Error;

    /// Resize the backing store to exactly `width` x `height` and clear it.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the surface cannot be resized.
    fn begin(&mut self, width: u32, height: u32) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Returns the backend's error if the pixels cannot be uploaded.
    fn draw_image(&mut self, image: &DecodedImage) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Returns the backend's error if the stroke style is rejected.
    fn stroke_rect(&mut self, rect: &Rect, stroke: &Stroke) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Returns the backend's error if the fill fails.
    fn fill_rect(&mut self, rect: &Rect, color: &str) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Returns the backend's error if the stroke style is rejected.
    fn line(&mut self, from: Point, to: Point, stroke: &Stroke) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Returns the backend's error if text drawing fails.
    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle) -> Result<(), Self::Error>;
}

impl Frame {
    /// Replay this frame onto `surface`, starting from a cleared backing store.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by the surface.
    pub fn paint<S: Surface>(&self, surface: &mut S) -> Result<(), S::Error> {
        surface.begin(self.width, self.height)?;
        for op in &self.ops {
            match op {
                DrawOp::Image(img) => surface.draw_image(img)?,
                DrawOp::StrokeRect { rect, stroke } => surface.stroke_rect(rect, stroke)?,
                DrawOp::FillRect { rect, color } => surface.fill_rect(rect, color)?,
                DrawOp::Line { from, to, stroke } => surface.line(*from, *to, stroke)?,
                DrawOp::Text { text, at, style } => surface.fill_text(text, *at, style)?,
            }
        }
        Ok(())
    }
}

/// Compose the scene for the current state.
#[must_use]
pub fn compose(input: &RenderInput<'_>) -> Frame {
    let (fallback_w, fallback_h) = input.fallback_size;
    match input.image {
        ImageLoad::Pending => Frame { width: fallback_w, height: fallback_h, ops: Vec::new() },
        ImageLoad::Failed(_) => Frame {
            width: fallback_w,
            height: fallback_h,
            ops: vec![error_placeholder(fallback_w, fallback_h)],
        },
        ImageLoad::Ready(img) => {
            let mut ops = vec![DrawOp::Image(img.clone())];
            for ann in input.annotations {
                let hovered = input.hovered_id == Some(ann.id);
                draw_annotation(&mut ops, ann, hovered, label_name(input.labels, ann.label_id));
            }

            if let Some(bbox) = input.pending_box {
                ops.push(DrawOp::StrokeRect { rect: bbox, stroke: pending_stroke() });
            }

            Frame { width: img.width, height: img.height, ops }
        }
    }
}

// =============================================================
// Layers
// =============================================================

fn draw_annotation(ops: &mut Vec<DrawOp>, ann: &Annotation, hovered: bool, label: Option<&str>) {
    let color = label_color(ann.label_id);
    let stroke = if hovered {
        Stroke::solid(HOVER_STROKE_COLOR, HOVER_STROKE_PX)
    } else {
        Stroke { color: color.clone(), width: ANNOTATION_STROKE_PX, alpha: ANNOTATION_STROKE_ALPHA, dash: None }
    };
    ops.push(DrawOp::StrokeRect { rect: ann.bounding_box, stroke });

    if let Some(name) = label {
        draw_tag(ops, &ann.bounding_box, name, color);
    }

    if hovered {
        draw_delete_glyph(ops, &ann.bounding_box);
    }
}

/// Filled tag sitting on top of the box's top-left corner. Pushed inside the
/// box when there is no room above it.
fn draw_tag(ops: &mut Vec<DrawOp>, bbox: &BoundingBox, name: &str, color: String) {
    #[allow(clippy::cast_precision_loss)]
    let text_w = name.chars().count() as f64 * TAG_CHAR_ADVANCE_PX;
    let rect = Rect {
        x: bbox.x,
        y: (bbox.y - TAG_HEIGHT_PX).max(0.0),
        width: text_w + TAG_PADDING_PX * 2.0,
        height: TAG_HEIGHT_PX,
    };
    ops.push(DrawOp::FillRect { rect, color });
    ops.push(DrawOp::Text {
        text: name.to_owned(),
        at: Point::new(rect.x + TAG_PADDING_PX, rect.y + rect.height / 2.0),
        style: TextStyle {
            color: TAG_TEXT_COLOR.to_owned(),
            font: format!("{TAG_FONT_PX:.0}px sans-serif"),
            align: TextAlign::Left,
        },
    });
}

fn draw_delete_glyph(ops: &mut Vec<DrawOp>, bbox: &BoundingBox) {
    let rect = delete_affordance_rect(bbox);
    ops.push(DrawOp::FillRect { rect, color: DELETE_GLYPH_FILL.to_owned() });

    let left = rect.x + DELETE_GLYPH_INSET_PX;
    let right = rect.right() - DELETE_GLYPH_INSET_PX;
    let top = rect.y + DELETE_GLYPH_INSET_PX;
    let bottom = rect.bottom() - DELETE_GLYPH_INSET_PX;
    let stroke = Stroke::solid(DELETE_GLYPH_STROKE, DELETE_GLYPH_STROKE_PX);
    ops.push(DrawOp::Line { from: Point::new(left, top), to: Point::new(right, bottom), stroke: stroke.clone() });
    ops.push(DrawOp::Line { from: Point::new(right, top), to: Point::new(left, bottom), stroke });
}

fn pending_stroke() -> Stroke {
    Stroke {
        color: PENDING_STROKE_COLOR.to_owned(),
        width: PENDING_STROKE_PX,
        alpha: 1.0,
        dash: Some(PENDING_DASH),
    }
}

fn error_placeholder(width: u32, height: u32) -> DrawOp {
    DrawOp::Text {
        text: IMAGE_ERROR_TEXT.to_owned(),
        at: Point::new(f64::from(width) / 2.0, f64::from(height) / 2.0),
        style: TextStyle {
            color: IMAGE_ERROR_COLOR.to_owned(),
            font: IMAGE_ERROR_FONT.to_owned(),
            align: TextAlign::Center,
        },
    }
}

/// Stable per-label hue so every box of a label shares a color.
#[must_use]
pub fn label_color(id: LabelId) -> String {
    let hue = (id.0.wrapping_mul(47)).rem_euclid(360);
    format!("hsl({hue}, 70%, 60%)")
}
