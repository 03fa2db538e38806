//! Input model: the interaction state machine's states, hover state, and label choices.
//!
//! `InteractionState` tracks the drawing lifecycle between pointer-down and
//! label assignment. Hover lives in `UiState` instead, because it is
//! orthogonal to drawing: folding both into one enum would admit illegal
//! combinations such as a live delete affordance in the middle of a drag.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::doc::{AnnotationId, LabelId};
use crate::geometry::{BoundingBox, Point};

/// Which phase of drawing the canvas is in.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    /// No gesture in progress; pointer-down starts a box or hits a delete affordance.
    #[default]
    Idle,
    /// The user is dragging out a new box.
    Drawing {
        /// Image-space point of the pointer-down.
        start: Point,
        /// Last image-space pointer position seen during the drag.
        current: Point,
    },
    /// A valid box is waiting for the user to choose a label.
    AwaitingLabel {
        /// The normalized box that will be committed.
        bbox: BoundingBox,
    },
}

impl InteractionState {
    /// The uncommitted box, if one is being drawn or awaits a label.
    #[must_use]
    pub fn pending_box(&self) -> Option<BoundingBox> {
        match *self {
            Self::Idle => None,
            Self::Drawing { start, current } => Some(BoundingBox::from_corners(start, current)),
            Self::AwaitingLabel { bbox } => Some(bbox),
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub fn is_drawing(&self) -> bool {
        matches!(self, Self::Drawing { .. })
    }
}

/// Pointer cursor the host should show over the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    /// Drawing cursor, shown everywhere except over a delete affordance.
    #[default]
    Crosshair,
    /// Shown over a live delete affordance.
    Pointer,
}

impl Cursor {
    /// CSS `cursor` value.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Crosshair => "crosshair",
            Self::Pointer => "pointer",
        }
    }
}

/// UI state visible to the renderer, independent of the drawing phase.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Annotation currently under the pointer, if any.
    pub hovered_id: Option<AnnotationId>,
    /// Cursor last reported to the host.
    pub cursor: Cursor,
}

/// The label-selection collaborator's answer for a pending box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelChoice {
    /// Use a label that already exists.
    Existing(LabelId),
    /// Create a label with this name first, then use it.
    New(String),
}
