//! In-memory store for tests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::types::{AnnotationDraft, AnnotationStore, LabelCatalog, SyncError};
use crate::doc::{Annotation, AnnotationId, Image, ImageId, Label, LabelId, TaskId};

#[derive(Default)]
pub(crate) struct MockState {
    pub next_id: i64,
    pub images: Vec<Image>,
    pub labels: Vec<Label>,
    pub annotations: Vec<Annotation>,
    pub create_error: Option<SyncError>,
    pub delete_error: Option<SyncError>,
    pub label_error: Option<SyncError>,
    pub list_error: Option<SyncError>,
    pub deleted: Vec<AnnotationId>,
}

/// Store double that assigns ids from 100 upward and can be told to fail.
#[derive(Default)]
pub(crate) struct MockStore {
    state: Mutex<MockState>,
}

impl MockStore {
    pub(crate) fn new() -> Self {
        let store = Self::default();
        store.state().next_id = 100;
        store
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_id(&self) -> i64 {
        let mut state = self.state();
        let id = state.next_id;
        state.next_id += 1;
        id
    }
}

#[async_trait::async_trait]
impl AnnotationStore for MockStore {
    async fn create_annotation(&self, image_id: ImageId, draft: &AnnotationDraft) -> Result<Annotation, SyncError> {
        if let Some(err) = self.state().create_error.clone() {
            return Err(err);
        }
        let ann = Annotation {
            id: AnnotationId(self.next_id()),
            image_id,
            label_id: draft.label_id,
            bounding_box: draft.bounding_box,
        };
        self.state().annotations.push(ann.clone());
        Ok(ann)
    }

    async fn delete_annotation(&self, id: AnnotationId) -> Result<(), SyncError> {
        let mut state = self.state();
        if let Some(err) = state.delete_error.clone() {
            return Err(err);
        }
        state.annotations.retain(|a| a.id != id);
        state.deleted.push(id);
        Ok(())
    }

    async fn list_images(&self, _task_id: TaskId) -> Result<Vec<Image>, SyncError> {
        let state = self.state();
        match &state.list_error {
            Some(err) => Err(err.clone()),
            None => Ok(state.images.clone()),
        }
    }

    async fn list_annotations(&self, _task_id: TaskId) -> Result<Vec<Annotation>, SyncError> {
        let state = self.state();
        match &state.list_error {
            Some(err) => Err(err.clone()),
            None => Ok(state.annotations.clone()),
        }
    }
}

#[async_trait::async_trait]
impl LabelCatalog for MockStore {
    async fn list_labels(&self) -> Result<Vec<Label>, SyncError> {
        Ok(self.state().labels.clone())
    }

    async fn create_label(&self, name: &str) -> Result<Label, SyncError> {
        if let Some(err) = self.state().label_error.clone() {
            return Err(err);
        }
        let label = Label { id: LabelId(self.next_id()), name: name.to_owned() };
        self.state().labels.push(label.clone());
        Ok(label)
    }
}
