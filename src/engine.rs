use tracing::{debug, warn};

use crate::consts::{DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH};
use crate::doc::{Annotation, AnnotationId, Image, ImageId, Label, LabelId};
use crate::error::CanvasError;
use crate::geometry::{BoundingBox, Point, Size};
use crate::hit::{self, HitPart};
use crate::image_load::{DecodedImage, ImageLoad, ImageLoadError};
use crate::input::{Cursor, InteractionState, LabelChoice, UiState};
use crate::render::{self, Frame, RenderInput};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// State visible in the frame changed.
    RenderNeeded,
    SetCursor(Cursor),
    /// Start decoding this image; report back through `image_loaded`.
    LoadImage(Image),
    /// A valid box is waiting for the label-selection collaborator.
    LabelRequested { bbox: BoundingBox },
    CreateAnnotation { image_id: ImageId, label_id: LabelId, bbox: BoundingBox },
    /// Create a label named `name` first, then the annotation with it.
    CreateLabelAndAnnotation { image_id: ImageId, name: String, bbox: BoundingBox },
    DeleteAnnotation { image_id: ImageId, id: AnnotationId },
}

/// Interaction and render state for one canvas showing one image at a time.
///
/// The annotation and label lists are owned by the caller and passed into
/// each call that needs them; the controller never stores or mutates them.
/// Pointer positions are expected in image space (see
/// [`crate::geometry::to_image_space`]).
pub struct CanvasController {
    image: Option<Image>,
    image_load: ImageLoad,
    input: InteractionState,
    ui: UiState,
    surface_size: (u32, u32),
}

impl Default for CanvasController {
    fn default() -> Self {
        Self {
            image: None,
            image_load: ImageLoad::Pending,
            input: InteractionState::Idle,
            ui: UiState::default(),
            surface_size: (DEFAULT_SURFACE_WIDTH, DEFAULT_SURFACE_HEIGHT),
        }
    }
}

impl CanvasController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Image lifecycle ---

    /// Make `image` the active image.
    ///
    /// Selecting a different image resets drawing and hover state before
    /// anything else happens, so no frame for the new image can show stale
    /// overlays. Re-selecting the same pixels is a no-op: no reset, no reload.
    pub fn set_image(&mut self, image: Image) -> Vec<Action> {
        if let Some(current) = self.image.as_mut() {
            if current.same_reference(&image) {
                *current = image;
                return Vec::new();
            }
        }

        let mut actions = self.reset_interaction();
        debug!(image_id = %image.id, "canvas image selected");
        self.image = Some(image.clone());
        self.image_load = ImageLoad::Pending;
        actions.push(Action::LoadImage(image));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Drop the active image, e.g. when the task has no images.
    pub fn clear_image(&mut self) -> Vec<Action> {
        let mut actions = self.reset_interaction();
        self.image = None;
        self.image_load = ImageLoad::Pending;
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Apply a finished image load.
    ///
    /// Loads for anything but the active image reference are ignored. A
    /// reload of the same id from new pixels supersedes the earlier load.
    pub fn image_loaded(&mut self, loaded: &Image, result: Result<DecodedImage, ImageLoadError>) -> Vec<Action> {
        let image_id = loaded.id;
        if !self.image.as_ref().is_some_and(|img| img.same_reference(loaded)) {
            warn!(%image_id, "stale image load ignored");
            return Vec::new();
        }
        match result {
            Ok(decoded) => {
                debug!(%image_id, width = decoded.width, height = decoded.height, "image decoded");
                self.surface_size = (decoded.width, decoded.height);
                self.image_load = ImageLoad::Ready(decoded);
            }
            Err(e) => {
                warn!(%image_id, error = %e, "image load failed");
                self.image_load = ImageLoad::Failed(e);
            }
        }
        vec![Action::RenderNeeded]
    }

    // --- Pointer input ---

    /// Pointer pressed at `pt`.
    ///
    /// From `Idle`, a press on the hovered annotation's delete affordance
    /// requests deletion; anything else starts a new box. Ignored in every
    /// other state and until the image has decoded.
    pub fn on_pointer_down(&mut self, pt: Point, annotations: &[Annotation]) -> Vec<Action> {
        let Some(image_id) = self.drawable_image_id() else {
            return Vec::new();
        };
        if !self.input.is_idle() {
            return Vec::new();
        }

        if let Some(hit) = hit::hit_test(annotations, pt, self.ui.hovered_id) {
            if hit.part == HitPart::DeleteAffordance {
                debug!(annotation_id = %hit.annotation_id, "delete requested");
                return vec![Action::DeleteAnnotation { image_id, id: hit.annotation_id }];
            }
        }

        self.input = InteractionState::Drawing { start: pt, current: pt };
        let mut actions = Vec::new();
        self.set_hover(None, &mut actions);
        self.set_cursor(Cursor::Crosshair, &mut actions);
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Pointer moved to `pt`. Extends the box while drawing; tracks hover while idle.
    pub fn on_pointer_move(&mut self, pt: Point, annotations: &[Annotation]) -> Vec<Action> {
        if self.drawable_image_id().is_none() {
            return Vec::new();
        }
        match &mut self.input {
            InteractionState::Drawing { current, .. } => {
                *current = pt;
                vec![Action::RenderNeeded]
            }
            InteractionState::Idle => {
                let mut actions = Vec::new();
                // The affordance may overhang a narrow box; hover holds while over it.
                let hovered = match self.ui.hovered_id {
                    Some(id) if hit::hits_delete_affordance(annotations, id, pt) => Some(id),
                    _ => hit::hit_test_topmost(annotations, pt),
                };
                self.set_hover(hovered, &mut actions);
                let over_glyph = hovered.is_some_and(|id| hit::hits_delete_affordance(annotations, id, pt));
                self.set_cursor(if over_glyph { Cursor::Pointer } else { Cursor::Crosshair }, &mut actions);
                actions
            }
            InteractionState::AwaitingLabel { .. } => Vec::new(),
        }
    }

    /// Pointer released. `None` (e.g. a touch end with no touch point left)
    /// finishes the box at the last known position.
    pub fn on_pointer_up(&mut self, pt: Option<Point>) -> Vec<Action> {
        match self.input {
            InteractionState::Drawing { current, .. } => self.finish_drawing(pt.unwrap_or(current)),
            _ => Vec::new(),
        }
    }

    /// Pointer left the canvas: finishes an active drag and clears hover.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        let mut actions = match self.input {
            InteractionState::Drawing { current, .. } => self.finish_drawing(current),
            _ => Vec::new(),
        };
        self.set_hover(None, &mut actions);
        self.set_cursor(Cursor::Crosshair, &mut actions);
        actions
    }

    fn finish_drawing(&mut self, end: Point) -> Vec<Action> {
        let InteractionState::Drawing { start, .. } = self.input else {
            return Vec::new();
        };
        let bbox = BoundingBox::from_corners(start, end);
        if bbox.meets_min_size() {
            self.input = InteractionState::AwaitingLabel { bbox };
            vec![Action::LabelRequested { bbox }, Action::RenderNeeded]
        } else {
            debug!(width = bbox.width, height = bbox.height, "undersized box discarded");
            self.input = InteractionState::Idle;
            vec![Action::RenderNeeded]
        }
    }

    // --- Label assignment ---

    /// Commit the pending box with the collaborator's label choice.
    ///
    /// On success the machine is back in `Idle` immediately; the create
    /// itself happens asynchronously and reports through the side channel.
    ///
    /// # Errors
    ///
    /// The box stays pending on every error:
    /// - [`CanvasError::NotAwaitingLabel`] when no box awaits a label,
    /// - [`CanvasError::NoLabelsAvailable`] when choosing an existing label from an empty list,
    /// - [`CanvasError::UnknownLabel`] when the chosen id is not in `labels`,
    /// - [`CanvasError::EmptyLabelName`] when a new label name is blank.
    pub fn confirm_label(&mut self, choice: LabelChoice, labels: &[Label]) -> Result<Vec<Action>, CanvasError> {
        let InteractionState::AwaitingLabel { bbox } = self.input else {
            return Err(CanvasError::NotAwaitingLabel);
        };
        let Some(image_id) = self.image.as_ref().map(|img| img.id) else {
            return Err(CanvasError::NotAwaitingLabel);
        };

        let action = match choice {
            LabelChoice::Existing(label_id) => {
                if labels.is_empty() {
                    return Err(CanvasError::NoLabelsAvailable);
                }
                if !labels.iter().any(|l| l.id == label_id) {
                    return Err(CanvasError::UnknownLabel(label_id));
                }
                Action::CreateAnnotation { image_id, label_id, bbox }
            }
            LabelChoice::New(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(CanvasError::EmptyLabelName);
                }
                Action::CreateLabelAndAnnotation { image_id, name: name.to_owned(), bbox }
            }
        };

        self.input = InteractionState::Idle;
        Ok(vec![action, Action::RenderNeeded])
    }

    /// Discard the pending box.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NotAwaitingLabel`] when no box awaits a label.
    pub fn cancel_label(&mut self) -> Result<Vec<Action>, CanvasError> {
        if !matches!(self.input, InteractionState::AwaitingLabel { .. }) {
            return Err(CanvasError::NotAwaitingLabel);
        }
        self.input = InteractionState::Idle;
        Ok(vec![Action::RenderNeeded])
    }

    // --- Data inputs ---

    /// An annotation left the list; drop any hover pointing at it.
    pub fn forget_annotation(&mut self, id: AnnotationId) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.ui.hovered_id == Some(id) {
            self.set_hover(None, &mut actions);
            self.set_cursor(Cursor::Crosshair, &mut actions);
        }
        actions
    }

    // --- Queries ---

    #[must_use]
    pub fn state(&self) -> InteractionState {
        self.input
    }

    /// The uncommitted box, while drawing or awaiting a label.
    #[must_use]
    pub fn pending_box(&self) -> Option<BoundingBox> {
        self.input.pending_box()
    }

    /// The box waiting for a label, if any. Observed by the label-selection UI.
    #[must_use]
    pub fn awaiting_label(&self) -> Option<BoundingBox> {
        match self.input {
            InteractionState::AwaitingLabel { bbox } => Some(bbox),
            _ => None,
        }
    }

    #[must_use]
    pub fn hovered(&self) -> Option<AnnotationId> {
        self.ui.hovered_id
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.ui.cursor
    }

    #[must_use]
    pub fn image(&self) -> Option<&Image> {
        self.image.as_ref()
    }

    #[must_use]
    pub fn image_load(&self) -> &ImageLoad {
        &self.image_load
    }

    /// Backing pixel size of the surface, used to map pointer positions.
    #[must_use]
    pub fn surface_size(&self) -> Size {
        let (w, h) = self.surface_size;
        Size::new(f64::from(w), f64::from(h))
    }

    // --- Render ---

    /// Compose the current frame.
    #[must_use]
    pub fn frame(&self, annotations: &[Annotation], labels: &[Label]) -> Frame {
        render::compose(&RenderInput {
            image: &self.image_load,
            annotations,
            pending_box: self.input.pending_box(),
            hovered_id: self.ui.hovered_id,
            labels,
            fallback_size: self.surface_size,
        })
    }

    // --- Internals ---

    fn drawable_image_id(&self) -> Option<ImageId> {
        match (&self.image, &self.image_load) {
            (Some(img), ImageLoad::Ready(_)) => Some(img.id),
            _ => None,
        }
    }

    fn reset_interaction(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if !self.input.is_idle() {
            debug!("interaction reset");
        }
        self.input = InteractionState::Idle;
        self.set_hover(None, &mut actions);
        self.set_cursor(Cursor::Crosshair, &mut actions);
        actions
    }

    fn set_hover(&mut self, hovered: Option<AnnotationId>, actions: &mut Vec<Action>) {
        if self.ui.hovered_id != hovered {
            self.ui.hovered_id = hovered;
            actions.push(Action::RenderNeeded);
        }
    }

    fn set_cursor(&mut self, cursor: Cursor, actions: &mut Vec<Action>) {
        if self.ui.cursor != cursor {
            self.ui.cursor = cursor;
            actions.push(Action::SetCursor(cursor));
        }
    }
}
