//! Notifier abstraction: how the guard tells the workflow engine to start.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

/// Workflow the engine should run after a local transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowEvent {
    /// Render the avatar video for an approved script.
    ApproveScript,
    /// Publish a rendered video to the social platforms.
    PostVideo,
}

impl WorkflowEvent {
    /// Path suffix appended to the webhook base URL.
    pub fn path(self) -> &'static str {
        match self {
            WorkflowEvent::ApproveScript => "approve-script",
            WorkflowEvent::PostVideo => "post-video",
        }
    }
}

impl fmt::Display for WorkflowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// JSON body sent with every workflow trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotifyPayload {
    pub script_id: String,
    pub requested_by_user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

impl NotifyPayload {
    pub fn new(script_id: impl Into<String>, actor: impl Into<String>) -> Self {
        NotifyPayload {
            script_id: script_id.into(),
            requested_by_user_id: actor.into(),
            tenant_id: None,
        }
    }

    pub fn with_tenant(mut self, tenant_id: Option<String>) -> Self {
        self.tenant_id = tenant_id;
        self
    }
}

/// Errors from triggering a workflow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    /// No webhook base URL is configured.
    #[error("workflow webhook is not configured (set N8N_BASE_URL)")]
    NotConfigured,

    /// The request never got a response (DNS, connect, timeout, ...).
    #[error("workflow webhook unreachable: {0}")]
    Transport(String),

    /// The engine answered with a non-2xx status.
    #[error("workflow webhook failed: {status} - {body}")]
    Rejected { status: u16, body: String },
}

/// Fire-and-forget trigger of an external workflow.
///
/// Implementations make one attempt and report whether the engine accepted
/// it. There is no retry; the guard compensates on `Err`.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: WorkflowEvent, payload: &NotifyPayload)
        -> Result<(), NotifyError>;
}

#[async_trait]
impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    async fn notify(
        &self,
        event: WorkflowEvent,
        payload: &NotifyPayload,
    ) -> Result<(), NotifyError> {
        (**self).notify(event, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_omits_missing_tenant() {
        let json = serde_json::to_value(NotifyPayload::new("s1", "u1")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"script_id": "s1", "requested_by_user_id": "u1"})
        );
    }

    #[test]
    fn payload_passes_tenant_through() {
        let payload = NotifyPayload::new("s1", "u1").with_tenant(Some("acme".into()));
        let json = serde_json::to_value(payload).unwrap();
        assert_eq!(json["tenant_id"], "acme");
    }

    #[test]
    fn event_paths() {
        assert_eq!(WorkflowEvent::ApproveScript.path(), "approve-script");
        assert_eq!(WorkflowEvent::PostVideo.to_string(), "post-video");
    }

    #[test]
    fn rejected_message_carries_status_and_body() {
        let err = NotifyError::Rejected {
            status: 503,
            body: "workflow inactive".into(),
        };
        assert_eq!(
            err.to_string(),
            "workflow webhook failed: 503 - workflow inactive"
        );
    }
}
