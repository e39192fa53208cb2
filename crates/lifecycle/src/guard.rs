//! The transition guard: approve and post-video with compensation.
//!
//! Each operation is a plain sequence:
//!
//! 1. validate input
//! 2. read the record and [`decide`]
//! 3. tentative write (`status` for approve, `processed` for post)
//! 4. notify the workflow engine
//! 5. on notify failure, write the previous value back and report
//!
//! The read in step 2 and the write in step 3 are not atomic. Two concurrent
//! approvals of one record can both pass step 2; the store is the source of
//! truth and the later caller simply sees a state it did not expect.

use reelops_storage::{ScriptRecord, ScriptStatus, ScriptStore, ScriptUpdate};
use serde::Serialize;

use crate::decision::{decide, Decision, Operation};
use crate::error::GuardError;
use crate::notifier::{Notifier, NotifyPayload, WorkflowEvent};

/// Successful result of a guarded operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionOutcome {
    pub script_id: String,
    pub status: ScriptStatus,
    pub processed: bool,
}

impl TransitionOutcome {
    fn from_record(record: &ScriptRecord) -> Self {
        TransitionOutcome {
            script_id: record.id.clone(),
            status: record.status,
            processed: record.processed,
        }
    }
}

/// Validates, writes, notifies, and compensates script lifecycle transitions.
pub struct TransitionGuard<S, N> {
    store: S,
    notifier: N,
    tenant_id: Option<String>,
}

impl<S: ScriptStore, N: Notifier> TransitionGuard<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        TransitionGuard {
            store,
            notifier,
            tenant_id: None,
        }
    }

    /// Tenant identifier passed through to every workflow payload.
    pub fn with_tenant(mut self, tenant_id: Option<String>) -> Self {
        self.tenant_id = tenant_id;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Approve a `Pending Script` record and trigger rendering.
    pub async fn approve(&self, id: &str, actor: &str) -> Result<TransitionOutcome, GuardError> {
        let record = self.check(id, actor, Operation::Approve).await?;
        let written = self
            .store
            .update(id, ScriptUpdate::status(ScriptStatus::ScriptApproved))
            .await?;

        self.notify_or_revert(
            id,
            actor,
            WorkflowEvent::ApproveScript,
            ScriptUpdate::status(record.status),
        )
        .await?;

        tracing::info!(script_id = id, actor, status = %written.status, "script approved");
        Ok(TransitionOutcome::from_record(&written))
    }

    /// Mark a `Video Ready (Preview)` record as processed and trigger posting.
    ///
    /// The status is left alone; the posting workflow moves it to `Posted`.
    pub async fn post_video(
        &self,
        id: &str,
        actor: &str,
    ) -> Result<TransitionOutcome, GuardError> {
        self.check(id, actor, Operation::PostVideo).await?;
        let written = self.store.update(id, ScriptUpdate::processed(true)).await?;

        self.notify_or_revert(
            id,
            actor,
            WorkflowEvent::PostVideo,
            ScriptUpdate::processed(false),
        )
        .await?;

        tracing::info!(script_id = id, actor, "video posting initiated");
        Ok(TransitionOutcome::from_record(&written))
    }

    /// Validate input, load the record, and apply [`decide`].
    async fn check(
        &self,
        id: &str,
        actor: &str,
        operation: Operation,
    ) -> Result<ScriptRecord, GuardError> {
        if id.trim().is_empty() {
            return Err(GuardError::Validation("script_id is required".into()));
        }
        if actor.trim().is_empty() {
            return Err(GuardError::Validation(
                "requested_by_user_id is required".into(),
            ));
        }

        let record = self.store.get(id).await?;
        match decide((&record).into(), operation) {
            Decision::Allow => Ok(record),
            Decision::Reject(reason) => {
                tracing::debug!(script_id = id, %operation, %reason, "transition rejected");
                Err(GuardError::InvalidTransition {
                    id: id.to_string(),
                    reason,
                })
            }
        }
    }

    async fn notify_or_revert(
        &self,
        id: &str,
        actor: &str,
        event: WorkflowEvent,
        revert: ScriptUpdate,
    ) -> Result<(), GuardError> {
        let payload = NotifyPayload::new(id, actor).with_tenant(self.tenant_id.clone());
        let Err(source) = self.notifier.notify(event, &payload).await else {
            return Ok(());
        };

        tracing::warn!(script_id = id, %event, error = %source, "workflow trigger failed, reverting");
        let reverted = match self.store.update(id, revert).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(
                    script_id = id,
                    %event,
                    error = %e,
                    "compensating write failed; record left in tentative state"
                );
                false
            }
        };

        Err(GuardError::NotifyFailed {
            id: id.to_string(),
            event,
            source,
            reverted,
        })
    }
}
