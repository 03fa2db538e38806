//! Document model: images, labels, annotations, and the per-image annotation store.
//!
//! Identifiers are assigned by the remote store and are never minted locally.
//! `AnnotationDoc` keeps each image's annotations in the order the store
//! confirmed them; that order is also draw order, so the last entry renders on
//! top and wins hit-tests.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Store-assigned identifier of an image.
    ImageId
);
id_type!(
    /// Store-assigned identifier of a label.
    LabelId
);
id_type!(
    /// Store-assigned identifier of an annotation.
    AnnotationId
);
id_type!(
    /// Store-assigned identifier of a labeling task (a batch of images).
    TaskId
);

/// Cached labeling status reported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    #[default]
    Unlabeled,
    Labeled,
}

/// Where an image's pixels come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelSource {
    /// Fetched over HTTP.
    Url(String),
    /// Encoded image bytes (PNG, JPEG, ...) already in memory.
    Inline(Arc<[u8]>),
}

/// An image as supplied by the image provider. Read-only to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub id: ImageId,
    pub original_filename: String,
    pub pixel_source: PixelSource,
    /// A hint only; an image with at least one annotation is labeled regardless.
    pub status: ImageStatus,
}

impl Image {
    /// Whether `other` points at the same pixels, so no reload is needed.
    #[must_use]
    pub fn same_reference(&self, other: &Image) -> bool {
        self.id == other.id && self.pixel_source == other.pixel_source
    }
}

/// A category that annotations are tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: LabelId,
    pub name: String,
}

/// A bounding box committed to the store with a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub image_id: ImageId,
    pub label_id: LabelId,
    pub bounding_box: BoundingBox,
}

/// Look up a label's name by id.
#[must_use]
pub fn label_name(labels: &[Label], id: LabelId) -> Option<&str> {
    labels.iter().find(|l| l.id == id).map(|l| l.name.as_str())
}

/// Annotations for every image in a task, grouped by image.
#[derive(Debug, Clone, Default)]
pub struct AnnotationDoc {
    by_image: HashMap<ImageId, Vec<Annotation>>,
}

impl AnnotationDoc {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything with a snapshot, grouping by image and keeping snapshot order.
    pub fn load_snapshot(&mut self, annotations: Vec<Annotation>) {
        self.by_image.clear();
        for ann in annotations {
            self.by_image.entry(ann.image_id).or_default().push(ann);
        }
    }

    /// Annotations for one image in draw order. Empty when none exist.
    #[must_use]
    pub fn for_image(&self, image_id: ImageId) -> &[Annotation] {
        self.by_image.get(&image_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Append a store-confirmed annotation. An annotation whose id is already
    /// present is replaced in place instead of duplicated.
    pub fn append(&mut self, ann: Annotation) {
        let list = self.by_image.entry(ann.image_id).or_default();
        if let Some(existing) = list.iter_mut().find(|a| a.id == ann.id) {
            *existing = ann;
        } else {
            list.push(ann);
        }
    }

    /// Remove an annotation by id from whichever image holds it.
    ///
    /// Returns `None` when it is already gone, which callers treat as a no-op.
    pub fn remove(&mut self, id: AnnotationId) -> Option<Annotation> {
        for list in self.by_image.values_mut() {
            if let Some(pos) = list.iter().position(|a| a.id == id) {
                return Some(list.remove(pos));
            }
        }
        None
    }

    /// Whether the image has at least one annotation.
    #[must_use]
    pub fn has_annotations(&self, image_id: ImageId) -> bool {
        !self.for_image(image_id).is_empty()
    }
}
