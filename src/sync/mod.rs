//! Sync: talks to the remote annotation store.
//!
//! DESIGN
//! ======
//! `AnnotationStore` and `LabelCatalog` are the async seams; `HttpAnnotationStore`
//! implements both over reqwest and tests substitute an in-memory store.
//! `SyncGateway` wraps them with fire-and-forget variants that report each
//! outcome as a `SyncEvent` on an unbounded channel.
//!
//! Create is never applied speculatively: a box appears in the local list only
//! after the store has assigned it an id. There is no idempotency key, so a
//! create retried after a timeout may be stored twice.

pub mod gateway;
pub mod http;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use gateway::{SyncEvent, SyncGateway, SyncOp, SyncTask};
pub use http::HttpAnnotationStore;
pub use types::{AnnotationDraft, AnnotationStore, LabelCatalog, SyncError};
