//! Error codes and controller-level errors.
//!
//! Every failure in this crate is per-operation and recoverable by repeating
//! the user gesture; nothing here is fatal to the host. Each error type
//! implements [`ErrorCode`] so hosts can log and branch on a stable code.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use crate::doc::LabelId;

/// Grepable error code and retryable flag.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Rejections from the label-assignment step. The pending box is kept in every case.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanvasError {
    /// No labels exist yet; the user has to create one first.
    #[error("no labels available: create a label first")]
    NoLabelsAvailable,

    /// The chosen label is not in the current label list.
    #[error("unknown label {0}")]
    UnknownLabel(LabelId),

    /// A new label was requested with a blank name.
    #[error("label name must not be empty")]
    EmptyLabelName,

    /// Confirm or cancel arrived while no box was waiting for a label.
    #[error("no box is awaiting a label")]
    NotAwaitingLabel,
}

impl ErrorCode for CanvasError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NoLabelsAvailable => "E_NO_LABELS",
            Self::UnknownLabel(_) => "E_UNKNOWN_LABEL",
            Self::EmptyLabelName => "E_EMPTY_LABEL_NAME",
            Self::NotAwaitingLabel => "E_NOT_AWAITING_LABEL",
        }
    }
}
