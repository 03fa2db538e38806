//! Workspace: the owner of everything the canvas controller borrows.
//!
//! Holds the task's images, labels and per-image annotation lists, routes
//! controller actions to the sync gateway and the image loader, and folds
//! their results back in. Async work is handed to the host as [`SyncTask`]s
//! via [`Workspace::take_tasks`]; results come back over channels drained by
//! [`Workspace::pump`].
//!
//! A typical host turn:
//! 1. forward a pointer or label event,
//! 2. spawn everything from `take_tasks`,
//! 3. call `pump` and show its notices,
//! 4. paint `take_frame` if it returns one.

#[cfg(test)]
#[path = "workspace_test.rs"]
mod workspace_test;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::doc::{Annotation, AnnotationDoc, Image, ImageId, ImageStatus, Label, TaskId};
use crate::engine::{Action, CanvasController};
use crate::error::{CanvasError, ErrorCode};
use crate::geometry::{BoundingBox, ElementBounds, Point, PointerInput, to_image_space};
use crate::image_load::{self, DecodedImage, HttpImageSource, ImageLoadError, ImageSource};
use crate::input::{Cursor, LabelChoice};
use crate::render::Frame;
use crate::sync::gateway::into_task;
use crate::sync::{HttpAnnotationStore, SyncError, SyncEvent, SyncGateway, SyncOp, SyncTask};

type LoadResult = (Image, Result<DecodedImage, ImageLoadError>);

/// Something the host should surface to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// A store call failed. Reported once per failed operation.
    SyncFailure { op: SyncOp, message: String, code: &'static str },
    /// A label was requested but none exist yet.
    NoLabelsAvailable,
    /// A box is waiting for the label-selection UI.
    LabelRequested { bbox: BoundingBox },
    /// The pointer cursor over the canvas should change.
    CursorChanged(Cursor),
}

impl Notice {
    fn sync_failure(op: SyncOp, error: &SyncError) -> Self {
        Self::SyncFailure { op, message: error.user_message(), code: error.error_code() }
    }
}

pub struct Workspace {
    images: Vec<Image>,
    labels: Vec<Label>,
    annotations: AnnotationDoc,
    controller: CanvasController,
    gateway: SyncGateway,
    image_source: Arc<dyn ImageSource>,
    sync_rx: mpsc::UnboundedReceiver<SyncEvent>,
    loads_tx: mpsc::UnboundedSender<LoadResult>,
    loads_rx: mpsc::UnboundedReceiver<LoadResult>,
    tasks: Vec<SyncTask>,
    notices: Vec<Notice>,
    dirty: bool,
}

impl Workspace {
    /// Empty workspace over an existing gateway and its event receiver.
    #[must_use]
    pub fn new(
        gateway: SyncGateway,
        sync_rx: mpsc::UnboundedReceiver<SyncEvent>,
        image_source: Arc<dyn ImageSource>,
    ) -> Self {
        let (loads_tx, loads_rx) = mpsc::unbounded_channel();
        Self {
            images: Vec::new(),
            labels: Vec::new(),
            annotations: AnnotationDoc::new(),
            controller: CanvasController::new(),
            gateway,
            image_source,
            sync_rx,
            loads_tx,
            loads_rx,
            tasks: Vec::new(),
            notices: Vec::new(),
            dirty: true,
        }
    }

    /// Workspace talking HTTP to the store at `config.api_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::HttpClientBuild`] if either HTTP client fails to build.
    pub fn connect(config: &StoreConfig) -> Result<Self, SyncError> {
        let store = Arc::new(HttpAnnotationStore::new(config)?);
        let images = HttpImageSource::new(config).map_err(|e| SyncError::HttpClientBuild(e.to_string()))?;
        let (gateway, sync_rx) = SyncGateway::new(store.clone(), store);
        Ok(Self::new(gateway, sync_rx, Arc::new(images)))
    }

    // --- Loading ---

    /// Replace the task data and select the first image.
    pub fn load(&mut self, images: Vec<Image>, labels: Vec<Label>, annotations: Vec<Annotation>) {
        debug!(images = images.len(), labels = labels.len(), annotations = annotations.len(), "workspace loaded");
        self.images = images;
        self.labels = labels;
        self.annotations.load_snapshot(annotations);
        match self.images.first().cloned() {
            Some(first) => {
                let actions = self.controller.set_image(first);
                self.dispatch(actions);
            }
            None => {
                let actions = self.controller.clear_image();
                self.dispatch(actions);
            }
        }
        if let Some(id) = self.controller.hovered() {
            if !self.current_annotations().iter().any(|a| a.id == id) {
                let actions = self.controller.forget_annotation(id);
                self.dispatch(actions);
            }
        }
        // The lists changed even when the selected image did not.
        self.dirty = true;
    }

    /// Fetch images, labels and annotations for a task and load them.
    ///
    /// # Errors
    ///
    /// Returns the first [`SyncError`] from the three fetches; nothing is replaced then.
    pub async fn hydrate(&mut self, task_id: TaskId) -> Result<(), SyncError> {
        let gateway = self.gateway.clone();
        let (images, labels, annotations) = futures::try_join!(
            gateway.store().list_images(task_id),
            gateway.labels().list_labels(),
            gateway.store().list_annotations(task_id),
        )
        .inspect_err(|e| warn!(%task_id, code = e.error_code(), error = %e, "hydrate failed"))?;
        info!(%task_id, images = images.len(), annotations = annotations.len(), "task hydrated");
        self.load(images, labels, annotations);
        Ok(())
    }

    /// Show another image of the task. Unknown ids are ignored.
    pub fn select_image(&mut self, image_id: ImageId) {
        let Some(image) = self.images.iter().find(|img| img.id == image_id).cloned() else {
            warn!(%image_id, "select_image: unknown image");
            return;
        };
        let actions = self.controller.set_image(image);
        self.dispatch(actions);
    }

    // --- Pointer input ---

    pub fn pointer_down(&mut self, input: &PointerInput, bounds: &ElementBounds) {
        let Some(pt) = self.image_point(input, bounds) else {
            return;
        };
        let anns: &[Annotation] = match self.selected_id() {
            Some(id) => self.annotations.for_image(id),
            None => &[],
        };
        let actions = self.controller.on_pointer_down(pt, anns);
        self.dispatch(actions);
    }

    pub fn pointer_move(&mut self, input: &PointerInput, bounds: &ElementBounds) {
        let Some(pt) = self.image_point(input, bounds) else {
            return;
        };
        let anns: &[Annotation] = match self.selected_id() {
            Some(id) => self.annotations.for_image(id),
            None => &[],
        };
        let actions = self.controller.on_pointer_move(pt, anns);
        self.dispatch(actions);
    }

    /// A release without a resolvable position ends the box at the last known point.
    pub fn pointer_up(&mut self, input: &PointerInput, bounds: &ElementBounds) {
        let pt = self.image_point(input, bounds);
        let actions = self.controller.on_pointer_up(pt);
        self.dispatch(actions);
    }

    pub fn pointer_leave(&mut self) {
        let actions = self.controller.on_pointer_leave();
        self.dispatch(actions);
    }

    // --- Label assignment ---

    /// Commit the pending box with the chosen label.
    ///
    /// # Errors
    ///
    /// Passes through the controller's [`CanvasError`]; the box stays pending.
    /// [`CanvasError::NoLabelsAvailable`] also raises [`Notice::NoLabelsAvailable`].
    pub fn confirm_label(&mut self, choice: LabelChoice) -> Result<(), CanvasError> {
        match self.controller.confirm_label(choice, &self.labels) {
            Ok(actions) => {
                self.dispatch(actions);
                Ok(())
            }
            Err(e) => {
                debug!(code = e.error_code(), "label choice rejected");
                if e == CanvasError::NoLabelsAvailable {
                    self.notices.push(Notice::NoLabelsAvailable);
                }
                Err(e)
            }
        }
    }

    /// Discard the pending box.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NotAwaitingLabel`] when no box is pending.
    pub fn cancel_label(&mut self) -> Result<(), CanvasError> {
        let actions = self.controller.cancel_label()?;
        self.dispatch(actions);
        Ok(())
    }

    // --- Host plumbing ---

    /// Async work queued since the last call, for the host to spawn.
    pub fn take_tasks(&mut self) -> Vec<SyncTask> {
        std::mem::take(&mut self.tasks)
    }

    /// Apply finished image loads and sync outcomes, then return pending notices.
    pub fn pump(&mut self) -> Vec<Notice> {
        while let Ok((image, result)) = self.loads_rx.try_recv() {
            let actions = self.controller.image_loaded(&image, result);
            self.dispatch(actions);
        }
        while let Ok(event) = self.sync_rx.try_recv() {
            self.apply_sync_event(event);
        }
        std::mem::take(&mut self.notices)
    }

    /// Fold one sync outcome into local state.
    pub fn apply_sync_event(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::Created(ann) => {
                let visible = self.is_selected(ann.image_id);
                self.annotations.append(ann);
                self.dirty |= visible;
            }
            SyncEvent::CreateFailed { error, .. } => {
                self.notices.push(Notice::sync_failure(SyncOp::CreateAnnotation, &error));
            }
            SyncEvent::Deleted { image_id, id } => {
                if self.annotations.remove(id).is_none() {
                    debug!(annotation_id = %id, "late delete ignored");
                    return;
                }
                let actions = self.controller.forget_annotation(id);
                self.dispatch(actions);
                self.dirty |= self.is_selected(image_id);
            }
            SyncEvent::DeleteFailed { error, .. } => {
                self.notices.push(Notice::sync_failure(SyncOp::DeleteAnnotation, &error));
            }
            SyncEvent::LabelCreated(label) => {
                if !self.labels.iter().any(|l| l.id == label.id) {
                    self.labels.push(label);
                    self.dirty = true;
                }
            }
            SyncEvent::LabelCreateFailed { error, .. } => {
                self.notices.push(Notice::sync_failure(SyncOp::CreateLabel, &error));
            }
        }
    }

    /// The next frame, if anything visible changed since the last one.
    pub fn take_frame(&mut self) -> Option<Frame> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.frame())
    }

    /// The current frame regardless of dirtiness.
    #[must_use]
    pub fn frame(&self) -> Frame {
        self.controller.frame(self.current_annotations(), &self.labels)
    }

    // --- Queries ---

    #[must_use]
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    #[must_use]
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    #[must_use]
    pub fn annotations_for(&self, image_id: ImageId) -> &[Annotation] {
        self.annotations.for_image(image_id)
    }

    /// Annotations of the selected image in draw order.
    #[must_use]
    pub fn current_annotations(&self) -> &[Annotation] {
        match self.selected_id() {
            Some(id) => self.annotations.for_image(id),
            None => &[],
        }
    }

    #[must_use]
    pub fn selected_image(&self) -> Option<&Image> {
        self.controller.image()
    }

    #[must_use]
    pub fn controller(&self) -> &CanvasController {
        &self.controller
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.controller.cursor()
    }

    /// An image is labeled once it has an annotation, whatever its cached status says.
    #[must_use]
    pub fn is_labeled(&self, image_id: ImageId) -> bool {
        self.annotations.has_annotations(image_id)
            || self
                .images
                .iter()
                .any(|img| img.id == image_id && img.status == ImageStatus::Labeled)
    }

    // --- Internals ---

    fn image_point(&self, input: &PointerInput, bounds: &ElementBounds) -> Option<Point> {
        to_image_space(input, bounds, self.controller.surface_size())
    }

    fn selected_id(&self) -> Option<ImageId> {
        self.controller.image().map(|img| img.id)
    }

    fn is_selected(&self, image_id: ImageId) -> bool {
        self.selected_id() == Some(image_id)
    }

    fn dispatch(&mut self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::RenderNeeded => self.dirty = true,
                Action::SetCursor(cursor) => self.notices.push(Notice::CursorChanged(cursor)),
                Action::LabelRequested { bbox } => self.notices.push(Notice::LabelRequested { bbox }),
                Action::LoadImage(image) => {
                    let task = self.load_task(image);
                    self.tasks.push(task);
                }
                Action::CreateAnnotation { image_id, label_id, bbox } => {
                    self.tasks.push(self.gateway.spawn_create(image_id, label_id, bbox));
                }
                Action::CreateLabelAndAnnotation { image_id, name, bbox } => {
                    self.tasks.push(self.gateway.spawn_create_with_label(image_id, name, bbox));
                }
                Action::DeleteAnnotation { image_id, id } => {
                    self.tasks.push(self.gateway.spawn_delete(image_id, id));
                }
            }
        }
    }

    fn load_task(&self, image: Image) -> SyncTask {
        let source = Arc::clone(&self.image_source);
        let tx = self.loads_tx.clone();
        into_task(async move {
            let result = image_load::load(source.as_ref(), &image.pixel_source).await;
            let image_id = image.id;
            if tx.send((image, result)).is_err() {
                warn!(%image_id, "image load dropped: workspace gone");
            }
        })
    }
}
