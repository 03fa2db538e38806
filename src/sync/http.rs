//! HTTP annotation store client.
//!
//! Thin reqwest wrapper over the store's JSON API. URL building and response
//! parsing are pure functions so they can be tested without a server.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{AnnotationDraft, AnnotationStore, LabelCatalog, LabelDraft, SyncError};
use crate::config::StoreConfig;
use crate::doc::{Annotation, AnnotationId, Image, ImageId, ImageStatus, Label, PixelSource, TaskId};

const CREATE_ANNOTATION_FALLBACK: &str = "Failed to save annotation";
const DELETE_ANNOTATION_FALLBACK: &str = "Failed to delete annotation";
const CREATE_LABEL_FALLBACK: &str = "Failed to create label";
const LIST_IMAGES_FALLBACK: &str = "Failed to fetch images";
const LIST_LABELS_FALLBACK: &str = "Failed to fetch labels";
const LIST_ANNOTATIONS_FALLBACK: &str = "Failed to fetch annotations";

// =============================================================================
// CLIENT
// =============================================================================

/// [`AnnotationStore`] and [`LabelCatalog`] over HTTP.
pub struct HttpAnnotationStore {
    http: reqwest::Client,
    base: String,
}

impl HttpAnnotationStore {
    /// Build a client with the configured base URL and timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::HttpClientBuild`] if the client fails to build.
    pub fn new(config: &StoreConfig) -> Result<Self, SyncError> {
        let http = config
            .timeouts
            .client()
            .map_err(|e| SyncError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base: config.api_url.trim_end_matches('/').to_owned() })
    }

    async fn read(response: reqwest::Response) -> Result<(u16, String), SyncError> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| SyncError::Request(e.to_string()))?;
        Ok((status, text))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, fallback: &str) -> Result<T, SyncError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SyncError::Request(e.to_string()))?;
        let (status, text) = Self::read(response).await?;
        if !is_success(status) {
            return Err(rejected(status, &text, fallback));
        }
        parse_json(&text)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl AnnotationStore for HttpAnnotationStore {
    async fn create_annotation(&self, image_id: ImageId, draft: &AnnotationDraft) -> Result<Annotation, SyncError> {
        let response = self
            .http
            .post(image_annotations_url(&self.base, image_id))
            .json(draft)
            .send()
            .await
            .map_err(|e| SyncError::Request(e.to_string()))?;
        let (status, text) = Self::read(response).await?;
        if !is_success(status) {
            return Err(rejected(status, &text, CREATE_ANNOTATION_FALLBACK));
        }
        parse_json(&text)
    }

    async fn delete_annotation(&self, id: AnnotationId) -> Result<(), SyncError> {
        let response = self
            .http
            .delete(annotation_url(&self.base, id))
            .send()
            .await
            .map_err(|e| SyncError::Request(e.to_string()))?;
        let (status, text) = Self::read(response).await?;
        if status == 404 {
            debug!(annotation_id = %id, "delete target already gone");
            return Ok(());
        }
        if !is_success(status) {
            return Err(rejected(status, &text, DELETE_ANNOTATION_FALLBACK));
        }
        Ok(())
    }

    async fn list_images(&self, task_id: TaskId) -> Result<Vec<Image>, SyncError> {
        let records: Vec<ImageRecord> = self
            .get_json(&task_images_url(&self.base, task_id), LIST_IMAGES_FALLBACK)
            .await?;
        Ok(records.into_iter().map(|r| r.into_image(&self.base)).collect())
    }

    async fn list_annotations(&self, task_id: TaskId) -> Result<Vec<Annotation>, SyncError> {
        self.get_json(&task_annotations_url(&self.base, task_id), LIST_ANNOTATIONS_FALLBACK)
            .await
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl LabelCatalog for HttpAnnotationStore {
    async fn list_labels(&self) -> Result<Vec<Label>, SyncError> {
        self.get_json(&labels_url(&self.base), LIST_LABELS_FALLBACK).await
    }

    async fn create_label(&self, name: &str) -> Result<Label, SyncError> {
        let response = self
            .http
            .post(labels_url(&self.base))
            .json(&LabelDraft { name })
            .send()
            .await
            .map_err(|e| SyncError::Request(e.to_string()))?;
        let (status, text) = Self::read(response).await?;
        if !is_success(status) {
            return Err(rejected(status, &text, CREATE_LABEL_FALLBACK));
        }
        parse_json(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
struct ImageRecord {
    id: ImageId,
    original_filename: String,
    #[serde(default)]
    status: ImageStatus,
}

impl ImageRecord {
    fn into_image(self, base: &str) -> Image {
        Image {
            id: self.id,
            pixel_source: PixelSource::Url(image_pixels_url(base, self.id)),
            original_filename: self.original_filename,
            status: self.status,
        }
    }
}

// =============================================================================
// URLS
// =============================================================================

fn image_annotations_url(base: &str, image_id: ImageId) -> String {
    format!("{base}/api/images/{image_id}/annotations")
}

fn annotation_url(base: &str, id: AnnotationId) -> String {
    format!("{base}/api/annotations/{id}")
}

fn labels_url(base: &str) -> String {
    format!("{base}/api/labels")
}

fn task_images_url(base: &str, task_id: TaskId) -> String {
    format!("{base}/api/tasks/{task_id}/images")
}

fn task_annotations_url(base: &str, task_id: TaskId) -> String {
    format!("{base}/api/tasks/{task_id}/annotations")
}

/// Where an image's encoded pixels are served.
#[must_use]
pub fn image_pixels_url(base: &str, image_id: ImageId) -> String {
    format!("{}/api/images/{image_id}", base.trim_end_matches('/'))
}

// =============================================================================
// PARSING
// =============================================================================

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, SyncError> {
    serde_json::from_str(text).map_err(|e| SyncError::Parse(e.to_string()))
}

/// The store reports failures as `{"detail": ...}`. Detail is usually a
/// string but validation errors carry structured JSON.
fn error_detail(body: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return None;
    };
    match value.get("detail")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn rejected(status: u16, body: &str, fallback: &str) -> SyncError {
    let detail = error_detail(body).unwrap_or_else(|| fallback.to_owned());
    SyncError::Rejected { status, detail }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;
