//! Sync gateway: runs store calls and reports their outcomes on a channel.
//!
//! The gateway never touches local state. Callers either await `create` /
//! `delete` directly or use the `spawn_*` variants, which return a boxed
//! future for the host to run on its executor (`tokio::spawn`,
//! `wasm_bindgen_futures::spawn_local`, ...). Spawned calls publish exactly one
//! terminal [`SyncEvent`] per operation; the owner drains them and folds the
//! results into its annotation lists.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::types::{AnnotationDraft, AnnotationStore, LabelCatalog, SyncError};
use crate::doc::{Annotation, AnnotationId, ImageId, Label, LabelId};
use crate::error::ErrorCode;
use crate::geometry::BoundingBox;

/// A fire-and-forget store call, ready to be spawned.
#[cfg(not(target_arch = "wasm32"))]
pub type SyncTask = futures::future::BoxFuture<'static, ()>;
/// A fire-and-forget store call, ready for `wasm_bindgen_futures::spawn_local`.
#[cfg(target_arch = "wasm32")]
pub type SyncTask = futures::future::LocalBoxFuture<'static, ()>;

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn into_task(fut: impl Future<Output = ()> + Send + 'static) -> SyncTask {
    fut.boxed()
}

// Browser futures are not Send; everything runs on the page's thread.
#[cfg(target_arch = "wasm32")]
pub(crate) fn into_task(fut: impl Future<Output = ()> + 'static) -> SyncTask {
    fut.boxed_local()
}

/// Which store operation an event or notice refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOp {
    CreateAnnotation,
    DeleteAnnotation,
    CreateLabel,
}

impl SyncOp {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateAnnotation => "create_annotation",
            Self::DeleteAnnotation => "delete_annotation",
            Self::CreateLabel => "create_label",
        }
    }
}

/// Outcome of a spawned store call.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Created(Annotation),
    CreateFailed { image_id: ImageId, error: SyncError },
    Deleted { image_id: ImageId, id: AnnotationId },
    DeleteFailed { image_id: ImageId, id: AnnotationId, error: SyncError },
    LabelCreated(Label),
    LabelCreateFailed { name: String, error: SyncError },
}

/// Handle to the remote store. Cheap to clone.
#[derive(Clone)]
pub struct SyncGateway {
    store: Arc<dyn AnnotationStore>,
    labels: Arc<dyn LabelCatalog>,
    events: mpsc::UnboundedSender<SyncEvent>,
}

impl SyncGateway {
    /// Create a gateway and the receiver its spawned calls report to.
    #[must_use]
    pub fn new(
        store: Arc<dyn AnnotationStore>,
        labels: Arc<dyn LabelCatalog>,
    ) -> (Self, mpsc::UnboundedReceiver<SyncEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (Self { store, labels, events }, rx)
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn AnnotationStore> {
        &self.store
    }

    #[must_use]
    pub fn labels(&self) -> &Arc<dyn LabelCatalog> {
        &self.labels
    }

    /// Persist a new annotation. No local state changes until the caller
    /// appends the returned annotation.
    ///
    /// # Errors
    ///
    /// Returns the store's [`SyncError`] unchanged.
    pub async fn create(&self, image_id: ImageId, label_id: LabelId, bbox: BoundingBox) -> Result<Annotation, SyncError> {
        let draft = AnnotationDraft { label_id, bounding_box: bbox };
        self.store.create_annotation(image_id, &draft).await
    }

    /// Remove an annotation from the store.
    ///
    /// # Errors
    ///
    /// Returns the store's [`SyncError`] unchanged.
    pub async fn delete(&self, id: AnnotationId) -> Result<(), SyncError> {
        self.store.delete_annotation(id).await
    }

    /// Spawnable `create` that reports [`SyncEvent::Created`] or [`SyncEvent::CreateFailed`].
    #[must_use]
    pub fn spawn_create(&self, image_id: ImageId, label_id: LabelId, bbox: BoundingBox) -> SyncTask {
        let gateway = self.clone();
        into_task(async move {
            let event = gateway.create_event(image_id, label_id, bbox).await;
            gateway.publish(event);
        })
    }

    /// Spawnable `delete` that reports [`SyncEvent::Deleted`] or [`SyncEvent::DeleteFailed`].
    #[must_use]
    pub fn spawn_delete(&self, image_id: ImageId, id: AnnotationId) -> SyncTask {
        let gateway = self.clone();
        into_task(async move {
            let event = match gateway.delete(id).await {
                Ok(()) => {
                    info!(%image_id, annotation_id = %id, "annotation deleted");
                    SyncEvent::Deleted { image_id, id }
                }
                Err(error) => {
                    warn!(%image_id, annotation_id = %id, code = error.error_code(), error = %error, "annotation delete failed");
                    SyncEvent::DeleteFailed { image_id, id, error }
                }
            };
            gateway.publish(event);
        })
    }

    /// Spawnable label creation followed by the annotation create.
    ///
    /// Publishes [`SyncEvent::LabelCreated`] and then the create outcome, or
    /// only [`SyncEvent::LabelCreateFailed`] when the label is refused.
    #[must_use]
    pub fn spawn_create_with_label(&self, image_id: ImageId, name: String, bbox: BoundingBox) -> SyncTask {
        let gateway = self.clone();
        into_task(async move {
            let label = match gateway.labels.create_label(&name).await {
                Ok(label) => label,
                Err(error) => {
                    warn!(%image_id, label = %name, code = error.error_code(), error = %error, "label create failed");
                    gateway.publish(SyncEvent::LabelCreateFailed { name, error });
                    return;
                }
            };
            info!(label_id = %label.id, label = %label.name, "label created");
            let label_id = label.id;
            gateway.publish(SyncEvent::LabelCreated(label));

            let event = gateway.create_event(image_id, label_id, bbox).await;
            gateway.publish(event);
        })
    }

    async fn create_event(&self, image_id: ImageId, label_id: LabelId, bbox: BoundingBox) -> SyncEvent {
        match self.create(image_id, label_id, bbox).await {
            Ok(annotation) => {
                info!(%image_id, annotation_id = %annotation.id, %label_id, "annotation created");
                SyncEvent::Created(annotation)
            }
            Err(error) => {
                warn!(%image_id, %label_id, code = error.error_code(), error = %error, "annotation create failed");
                SyncEvent::CreateFailed { image_id, error }
            }
        }
    }

    fn publish(&self, event: SyncEvent) {
        if self.events.send(event).is_err() {
            warn!("sync event dropped: receiver closed");
        }
    }
}

#[cfg(test)]
#[path = "gateway_test.rs"]
mod gateway_test;
