use reelops_storage::{ScriptStatus, StorageError};

use crate::decision::RejectReason;
use crate::notifier::{NotifyError, WorkflowEvent};

/// All errors returned by the transition guard.
///
/// Every variant leaves the record in a previously valid state: nothing was
/// written, or the tentative write has been reverted (see `reverted`).
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    /// Missing or blank input, rejected before any store access.
    #[error("{0}")]
    Validation(String),

    /// No record with the given id.
    #[error("Script not found: {id}")]
    NotFound { id: String },

    /// The record's status or `processed` flag does not permit the operation.
    #[error("{reason}")]
    InvalidTransition { id: String, reason: RejectReason },

    /// The workflow engine could not be triggered.
    ///
    /// `reverted` is false only if the compensating write also failed, in
    /// which case the record needs manual attention.
    #[error("Failed to trigger {event} workflow for script {id}: {source}")]
    NotifyFailed {
        id: String,
        event: WorkflowEvent,
        #[source]
        source: NotifyError,
        reverted: bool,
    },

    /// The record store failed for a reason other than a missing record.
    #[error(transparent)]
    Storage(StorageError),
}

impl GuardError {
    /// Status the record was in when an `InvalidTransition` was raised.
    pub fn current_status(&self) -> Option<ScriptStatus> {
        match self {
            GuardError::InvalidTransition { reason, .. } => Some(reason.current_status()),
            _ => None,
        }
    }

    /// Stable machine-readable code, used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            GuardError::Validation(_) => "BAD_REQUEST",
            GuardError::NotFound { .. } => "NOT_FOUND",
            GuardError::InvalidTransition { .. } => "INVALID_TRANSITION",
            GuardError::NotifyFailed { .. } => "NOTIFY_FAILED",
            GuardError::Storage(_) => "SERVER_ERROR",
        }
    }
}

impl From<StorageError> for GuardError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { id } => GuardError::NotFound { id },
            other => GuardError::Storage(other),
        }
    }
}
