//! Sync types: store traits, wire payloads, and errors.

use serde::Serialize;

use crate::doc::{Annotation, AnnotationId, Image, ImageId, Label, LabelId, TaskId};
use crate::error::ErrorCode;
use crate::geometry::BoundingBox;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by annotation store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// The request never got an answer (connect failure, timeout, reset).
    #[error("store request failed: {0}")]
    Request(String),

    /// The store answered with a non-success status.
    #[error("store rejected request: status {status}: {detail}")]
    Rejected { status: u16, detail: String },

    /// The store's response body could not be deserialized.
    #[error("store response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for SyncError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_STORE_REQUEST",
            Self::Rejected { .. } => "E_STORE_REJECTED",
            Self::Parse(_) => "E_STORE_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Rejected { status: 429 | 500..=599, .. })
    }
}

impl SyncError {
    /// Message for the person at the canvas. Tells an unreachable store apart
    /// from one that refused the request.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Request(_) => "Could not reach the annotation store.".to_owned(),
            Self::Rejected { detail, .. } => format!("The annotation store rejected the request: {detail}"),
            Self::Parse(_) => "The annotation store sent an unreadable response.".to_owned(),
            Self::HttpClientBuild(_) => "The annotation client is misconfigured.".to_owned(),
        }
    }
}

// =============================================================================
// WIRE
// =============================================================================

/// Body of `POST /api/images/{id}/annotations`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationDraft {
    pub label_id: LabelId,
    pub bounding_box: BoundingBox,
}

/// Body of `POST /api/labels`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelDraft<'a> {
    pub name: &'a str,
}

// =============================================================================
// TRAITS
// =============================================================================

/// Remote annotation persistence. Enables mocking in tests.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait AnnotationStore: Send + Sync {
    /// Persist a new annotation; the store assigns its id.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] if the request fails or is rejected.
    async fn create_annotation(&self, image_id: ImageId, draft: &AnnotationDraft) -> Result<Annotation, SyncError>;

    /// Remove an annotation. Removing one that is already gone succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] if the request fails or is rejected.
    async fn delete_annotation(&self, id: AnnotationId) -> Result<(), SyncError>;

    /// # Errors
    ///
    /// Returns a [`SyncError`] if the request fails or is rejected.
    async fn list_images(&self, task_id: TaskId) -> Result<Vec<Image>, SyncError>;

    /// # Errors
    ///
    /// Returns a [`SyncError`] if the request fails or is rejected.
    async fn list_annotations(&self, task_id: TaskId) -> Result<Vec<Annotation>, SyncError>;
}

/// Remote label catalog.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait LabelCatalog: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`SyncError`] if the request fails or is rejected.
    async fn list_labels(&self) -> Result<Vec<Label>, SyncError>;

    /// # Errors
    ///
    /// Returns a [`SyncError`] if the request fails or the name is refused.
    async fn create_label(&self, name: &str) -> Result<Label, SyncError>;
}
