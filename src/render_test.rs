#![allow(clippy::float_cmp)]

use std::sync::Arc;

use super::*;
use crate::doc::ImageId;
use crate::image_load::ImageLoadError;

// =============================================================
// Helpers
// =============================================================

fn decoded(width: u32, height: u32) -> DecodedImage {
    DecodedImage { width, height, rgba: Arc::from(vec![0u8; (width * height * 4) as usize]) }
}

fn ann(id: i64, label: i64, x: f64, y: f64, w: f64, h: f64) -> Annotation {
    Annotation {
        id: AnnotationId(id),
        image_id: ImageId(1),
        label_id: LabelId(label),
        bounding_box: Rect::new(x, y, w, h),
    }
}

fn labels() -> Vec<Label> {
    vec![Label { id: LabelId(1), name: "cat".into() }, Label { id: LabelId(2), name: "dog".into() }]
}

fn input<'a>(image: &'a ImageLoad, annotations: &'a [Annotation], labels: &'a [Label]) -> RenderInput<'a> {
    RenderInput { image, annotations, pending_box: None, hovered_id: None, labels, fallback_size: (300, 150) }
}

fn stroke_rects(frame: &Frame) -> Vec<(&Rect, &Stroke)> {
    frame
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::StrokeRect { rect, stroke } => Some((rect, stroke)),
            _ => None,
        })
        .collect()
}

fn texts(frame: &Frame) -> Vec<&str> {
    frame
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

fn line_count(frame: &Frame) -> usize {
    frame.ops.iter().filter(|op| matches!(op, DrawOp::Line { .. })).count()
}

/// Surface that records calls for replay assertions.
#[derive(Default)]
struct Recorder {
    calls: Vec<String>,
    fail_on_text: bool,
}

impl Surface for Recorder {
    type Error = String;

    fn begin(&mut self, width: u32, height: u32) -> Result<(), String> {
        self.calls.push(format!("begin {width}x{height}"));
        Ok(())
    }

    fn draw_image(&mut self, image: &DecodedImage) -> Result<(), String> {
        self.calls.push(format!("image {}x{}", image.width, image.height));
        Ok(())
    }

    fn stroke_rect(&mut self, rect: &Rect, _stroke: &Stroke) -> Result<(), String> {
        self.calls.push(format!("stroke {} {}", rect.x, rect.y));
        Ok(())
    }

    fn fill_rect(&mut self, rect: &Rect, color: &str) -> Result<(), String> {
        self.calls.push(format!("fill {} {} {color}", rect.x, rect.y));
        Ok(())
    }

    fn line(&mut self, _from: Point, _to: Point, _stroke: &Stroke) -> Result<(), String> {
        self.calls.push("line".into());
        Ok(())
    }

    fn fill_text(&mut self, text: &str, _at: Point, _style: &TextStyle) -> Result<(), String> {
        if self.fail_on_text {
            return Err("text unsupported".into());
        }
        self.calls.push(format!("text {text}"));
        Ok(())
    }
}

// =============================================================
// Image layer
// =============================================================

#[test]
fn frame_matches_natural_image_size() {
    let image = ImageLoad::Ready(decoded(640, 480));
    let frame = compose(&input(&image, &[], &[]));
    assert_eq!((frame.width, frame.height), (640, 480));
    assert!(matches!(frame.ops.first(), Some(DrawOp::Image(img)) if img.width == 640));
}

#[test]
fn pending_image_is_blank_at_fallback_size() {
    let image = ImageLoad::Pending;
    let anns = [ann(1, 1, 0.0, 0.0, 20.0, 20.0)];
    let frame = compose(&input(&image, &anns, &[]));
    assert_eq!((frame.width, frame.height), (300, 150));
    assert!(frame.ops.is_empty());
}

#[test]
fn failed_image_renders_only_centered_message() {
    let image = ImageLoad::Failed(ImageLoadError::Decode("bad".into()));
    let anns = [ann(1, 1, 0.0, 0.0, 20.0, 20.0)];
    let mut inp = input(&image, &anns, &[]);
    inp.pending_box = Some(Rect::new(0.0, 0.0, 50.0, 50.0));
    inp.fallback_size = (400, 200);
    let frame = compose(&inp);

    assert_eq!(frame.ops.len(), 1);
    let DrawOp::Text { text, at, style } = &frame.ops[0] else {
        panic!("expected text op, got {:?}", frame.ops[0]);
    };
    assert_eq!(text, "Could not load image.");
    assert_eq!(*at, Point::new(200.0, 100.0));
    assert_eq!(style.align, TextAlign::Center);
}

// =============================================================
// Annotation layer
// =============================================================

#[test]
fn annotations_stroked_in_list_order() {
    let image = ImageLoad::Ready(decoded(200, 200));
    let anns = [ann(1, 1, 10.0, 10.0, 20.0, 20.0), ann(2, 1, 50.0, 50.0, 20.0, 20.0)];
    let frame = compose(&input(&image, &anns, &[]));
    let rects: Vec<f64> = stroke_rects(&frame).iter().map(|(r, _)| r.x).collect();
    assert_eq!(rects, vec![10.0, 50.0]);
}

#[test]
fn standard_stroke_uses_label_color() {
    let image = ImageLoad::Ready(decoded(200, 200));
    let anns = [ann(1, 2, 10.0, 10.0, 20.0, 20.0)];
    let frame = compose(&input(&image, &anns, &[]));
    let (_, stroke) = stroke_rects(&frame)[0];
    assert_eq!(stroke.color, label_color(LabelId(2)));
    assert_eq!(stroke.width, 4.0);
    assert_eq!(stroke.alpha, 0.8);
    assert!(stroke.dash.is_none());
}

#[test]
fn hovered_annotation_gets_accent_and_glyph() {
    let image = ImageLoad::Ready(decoded(200, 200));
    let anns = [ann(1, 1, 10.0, 10.0, 50.0, 50.0), ann(2, 1, 100.0, 100.0, 50.0, 50.0)];
    let mut inp = input(&image, &anns, &[]);
    inp.hovered_id = Some(AnnotationId(2));
    let frame = compose(&inp);

    let strokes = stroke_rects(&frame);
    assert_eq!(strokes[0].1.width, 4.0);
    assert_eq!(strokes[1].1.width, 6.0);
    assert_eq!(strokes[1].1.color, "#ffd400");

    // Delete glyph: red square at the hovered box's top-right plus a cross.
    assert_eq!(line_count(&frame), 2);
    let glyph = frame.ops.iter().find_map(|op| match op {
        DrawOp::FillRect { rect, color } if color == "#e74c3c" => Some(*rect),
        _ => None,
    });
    assert_eq!(glyph, Some(Rect::new(126.0, 100.0, 24.0, 24.0)));
}

#[test]
fn no_glyph_without_hover() {
    let image = ImageLoad::Ready(decoded(200, 200));
    let anns = [ann(1, 1, 10.0, 10.0, 50.0, 50.0)];
    let frame = compose(&input(&image, &anns, &[]));
    assert_eq!(line_count(&frame), 0);
}

#[test]
fn hover_on_unknown_id_changes_nothing() {
    let image = ImageLoad::Ready(decoded(200, 200));
    let anns = [ann(1, 1, 10.0, 10.0, 50.0, 50.0)];
    let mut inp = input(&image, &anns, &[]);
    let plain = compose(&inp);
    inp.hovered_id = Some(AnnotationId(99));
    assert_eq!(compose(&inp), plain);
}

// =============================================================
// Label tags
// =============================================================

#[test]
fn resolvable_label_draws_tag_above_box() {
    let image = ImageLoad::Ready(decoded(200, 200));
    let anns = [ann(1, 1, 40.0, 60.0, 50.0, 50.0)];
    let labels = labels();
    let frame = compose(&input(&image, &anns, &labels));

    assert_eq!(texts(&frame), vec!["cat"]);
    let tag = frame.ops.iter().find_map(|op| match op {
        DrawOp::FillRect { rect, .. } => Some(*rect),
        _ => None,
    });
    let tag = tag.unwrap();
    assert_eq!(tag.x, 40.0);
    assert_eq!(tag.y, 40.0);
    assert_eq!(tag.bottom(), 60.0);
}

#[test]
fn tag_clamped_inside_when_box_touches_top() {
    let image = ImageLoad::Ready(decoded(200, 200));
    let anns = [ann(1, 1, 0.0, 5.0, 50.0, 50.0)];
    let labels = labels();
    let frame = compose(&input(&image, &anns, &labels));
    let tag = frame
        .ops
        .iter()
        .find_map(|op| match op {
            DrawOp::FillRect { rect, .. } => Some(*rect),
            _ => None,
        })
        .unwrap();
    assert_eq!(tag.y, 0.0);
}

#[test]
fn unresolvable_label_draws_no_tag() {
    let image = ImageLoad::Ready(decoded(200, 200));
    let anns = [ann(1, 9, 40.0, 60.0, 50.0, 50.0)];
    let labels = labels();
    let frame = compose(&input(&image, &anns, &labels));
    assert!(texts(&frame).is_empty());
}

#[test]
fn tag_width_grows_with_name() {
    let image = ImageLoad::Ready(decoded(400, 400));
    let long = vec![Label { id: LabelId(1), name: "traffic light".into() }];
    let short = vec![Label { id: LabelId(1), name: "car".into() }];
    let anns = [ann(1, 1, 40.0, 60.0, 50.0, 50.0)];
    let width_of = |labels: &[Label]| {
        compose(&input(&image, &anns, labels))
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::FillRect { rect, .. } => Some(rect.width),
                _ => None,
            })
            .unwrap()
    };
    assert!(width_of(&long) > width_of(&short));
}

// =============================================================
// Pending box
// =============================================================

#[test]
fn pending_box_is_dashed_and_last() {
    let image = ImageLoad::Ready(decoded(200, 200));
    let anns = [ann(1, 1, 10.0, 10.0, 50.0, 50.0)];
    let mut inp = input(&image, &anns, &[]);
    inp.pending_box = Some(Rect::new(70.0, 70.0, 30.0, 30.0));
    let frame = compose(&inp);

    let Some(DrawOp::StrokeRect { rect, stroke }) = frame.ops.last() else {
        panic!("pending box should be the top layer");
    };
    assert_eq!(*rect, Rect::new(70.0, 70.0, 30.0, 30.0));
    assert_eq!(stroke.dash, Some([5.0, 5.0]));
    assert_eq!(stroke.color, "#00f6d2");
}

// =============================================================
// Purity
// =============================================================

#[test]
fn compose_is_deterministic_and_leaves_inputs_alone() {
    let image = ImageLoad::Ready(decoded(100, 100));
    let anns = vec![ann(1, 1, 10.0, 10.0, 50.0, 50.0)];
    let labels = labels();
    let before = anns.clone();
    let mut inp = input(&image, &anns, &labels);
    inp.hovered_id = Some(AnnotationId(1));
    inp.pending_box = Some(Rect::new(0.0, 0.0, 12.0, 12.0));

    assert_eq!(compose(&inp), compose(&inp));
    assert_eq!(anns, before);
}

#[test]
fn label_color_is_stable_hsl() {
    assert_eq!(label_color(LabelId(1)), "hsl(47, 70%, 60%)");
    assert_eq!(label_color(LabelId(8)), "hsl(16, 70%, 60%)");
    assert_eq!(label_color(LabelId(-1)), "hsl(313, 70%, 60%)");
}

// =============================================================
// Frame::paint
// =============================================================

#[test]
fn paint_begins_then_replays_in_order() {
    let image = ImageLoad::Ready(decoded(20, 10));
    let anns = [ann(1, 1, 2.0, 3.0, 12.0, 12.0)];
    let labels = labels();
    let frame = compose(&input(&image, &anns, &labels));

    let mut rec = Recorder::default();
    frame.paint(&mut rec).unwrap();
    assert_eq!(rec.calls[0], "begin 20x10");
    assert_eq!(rec.calls[1], "image 20x10");
    assert_eq!(rec.calls[2], "stroke 2 3");
    assert!(rec.calls[3].starts_with("fill 2 0"));
    assert_eq!(rec.calls[4], "text cat");
}

#[test]
fn paint_stops_at_first_surface_error() {
    let image = ImageLoad::Failed(ImageLoadError::Fetch("offline".into()));
    let frame = compose(&input(&image, &[], &[]));
    let mut rec = Recorder { fail_on_text: true, ..Recorder::default() };
    assert_eq!(frame.paint(&mut rec), Err("text unsupported".to_owned()));
    assert_eq!(rec.calls, vec!["begin 300x150".to_owned()]);
}
