//! Bounding-box annotation canvas for image labeling tasks.
//!
//! The crate owns the interactive part of a labeling tool: turning pointer
//! input on a displayed image into new boxes, tracking hover and the delete
//! affordance, composing each frame, and keeping a task's annotations in sync
//! with a remote store. It compiles natively (tests, headless hosts) and to
//! WebAssembly, where `web` replays frames onto a `<canvas>`.
//!
//! Hosts drive a [`workspace::Workspace`]: forward pointer and label events,
//! spawn the returned tasks on their executor, then `pump` and paint.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`workspace`] | Owner of images, labels and annotation lists; routes actions |
//! | [`engine`] | [`engine::CanvasController`]: drawing state machine and hover |
//! | [`input`] | Interaction states, cursor and label-choice types |
//! | [`geometry`] | Points, boxes, pointer-to-image mapping |
//! | [`hit`] | Hit-testing annotations and delete affordances |
//! | [`render`] | Pure frame composition and the [`render::Surface`] trait |
//! | [`image_load`] | Fetching and decoding image pixels |
//! | [`sync`] | Remote store client and fire-and-forget gateway |
//! | [`doc`] | Ids, images, labels, annotations, per-image annotation lists |
//! | [`config`] | Store URL and timeouts from the environment |
//! | [`error`] | `ErrorCode` trait and controller errors |
//! | [`consts`] | Shared sizes and colors |

pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod hit;
pub mod image_load;
pub mod input;
pub mod render;
pub mod sync;
#[cfg(target_arch = "wasm32")]
pub mod web;
pub mod workspace;
