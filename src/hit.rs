#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::doc::{Annotation, AnnotationId};
use crate::geometry::{Point, contains_point, delete_affordance_rect};

/// Which part of an annotation was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    DeleteAffordance,
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub annotation_id: AnnotationId,
    pub part: HitPart,
}

/// The topmost annotation whose box contains `pt`.
///
/// Annotations render in list order, so the scan runs back to front and the
/// last-drawn match wins.
#[must_use]
pub fn hit_test_topmost(annotations: &[Annotation], pt: Point) -> Option<AnnotationId> {
    annotations
        .iter()
        .rev()
        .find(|a| contains_point(&a.bounding_box, pt))
        .map(|a| a.id)
}

/// Whether `pt` lands on the delete affordance of the annotation with `id`.
#[must_use]
pub fn hits_delete_affordance(annotations: &[Annotation], id: AnnotationId, pt: Point) -> bool {
    annotations
        .iter()
        .find(|a| a.id == id)
        .is_some_and(|a| delete_affordance_rect(&a.bounding_box).contains(pt))
}

/// Full hit test: the delete affordance of `hovered` first, then bodies top-down.
///
/// The affordance is only live on the hovered annotation, matching what the
/// renderer shows.
#[must_use]
pub fn hit_test(annotations: &[Annotation], pt: Point, hovered: Option<AnnotationId>) -> Option<Hit> {
    if let Some(id) = hovered {
        if hits_delete_affordance(annotations, id, pt) {
            return Some(Hit { annotation_id: id, part: HitPart::DeleteAffordance });
        }
    }
    hit_test_topmost(annotations, pt).map(|annotation_id| Hit { annotation_id, part: HitPart::Body })
}
