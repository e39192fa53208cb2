//! Pure transition decisions: which operation a record's current state allows.
//!
//! No I/O happens here. The guard reads a record, asks [`decide`], and only
//! touches the store or the workflow engine on [`Decision::Allow`].

use std::fmt;

use reelops_storage::{ScriptRecord, ScriptStatus};
use serde::Serialize;

/// A guarded operation requested by a dashboard user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Approve a pending script and start rendering.
    Approve,
    /// Publish a rendered preview to the social platforms.
    PostVideo,
}

impl Operation {
    /// The status a record must be in for this operation to proceed.
    pub fn required_status(self) -> ScriptStatus {
        match self {
            Operation::Approve => ScriptStatus::PendingScript,
            Operation::PostVideo => ScriptStatus::VideoReadyPreview,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Approve => f.write_str("approve"),
            Operation::PostVideo => f.write_str("post-video"),
        }
    }
}

/// The slice of a record that decisions depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordState {
    pub status: ScriptStatus,
    pub processed: bool,
}

impl RecordState {
    pub fn new(status: ScriptStatus, processed: bool) -> Self {
        RecordState { status, processed }
    }
}

impl From<&ScriptRecord> for RecordState {
    fn from(record: &ScriptRecord) -> Self {
        RecordState {
            status: record.status,
            processed: record.processed,
        }
    }
}

/// Why an operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The record is not in the status the operation starts from.
    WrongStatus {
        operation: Operation,
        current: ScriptStatus,
    },
    /// A post was already accepted for this record.
    AlreadyProcessed { current: ScriptStatus },
}

impl RejectReason {
    pub fn current_status(&self) -> ScriptStatus {
        match self {
            RejectReason::WrongStatus { current, .. } | RejectReason::AlreadyProcessed { current } => {
                *current
            }
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::WrongStatus {
                operation: Operation::Approve,
                current,
            } => write!(
                f,
                "Cannot approve script with status \"{}\". Only scripts with status \"{}\" can be approved.",
                current,
                Operation::Approve.required_status()
            ),
            RejectReason::WrongStatus {
                operation: Operation::PostVideo,
                current,
            } => write!(
                f,
                "Cannot post video with status \"{}\". Only videos with status \"{}\" can be posted.",
                current,
                Operation::PostVideo.required_status()
            ),
            RejectReason::AlreadyProcessed { current } => write!(
                f,
                "Video already processed (current status \"{}\"); it has been posted or is being posted.",
                current
            ),
        }
    }
}

/// Outcome of [`decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Reject(RejectReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Decide whether `operation` may run against a record in `state`.
///
/// `processed` blocks `PostVideo` no matter what the status is, so a record
/// the pipeline has not yet moved to `Posted` still cannot be posted twice.
pub fn decide(state: RecordState, operation: Operation) -> Decision {
    match (operation, state.status, state.processed) {
        (Operation::Approve, ScriptStatus::PendingScript, _) => Decision::Allow,
        (Operation::PostVideo, current, true) => {
            Decision::Reject(RejectReason::AlreadyProcessed { current })
        }
        (Operation::PostVideo, ScriptStatus::VideoReadyPreview, false) => Decision::Allow,
        (operation, current, _) => {
            Decision::Reject(RejectReason::WrongStatus { operation, current })
        }
    }
}
