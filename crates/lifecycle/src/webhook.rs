//! HTTP webhook notifier for the n8n workflow engine.
//!
//! Uses `ureq` (sync) wrapped in `tokio::task::spawn_blocking` to avoid
//! blocking the async runtime. Each event is POSTed as JSON to
//! `{base_url}/webhook/{event}`.

use std::time::Duration;

use async_trait::async_trait;

use crate::notifier::{Notifier, NotifyError, NotifyPayload, WorkflowEvent};

/// Header carrying the shared secret, when one is configured.
pub const WEBHOOK_SECRET_HEADER: &str = "X-Webhook-Secret";

/// Default per-request timeout.
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`WebhookNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    /// Engine base URL, e.g. `https://n8n.example.com`. `None` means every
    /// notify fails with [`NotifyError::NotConfigured`].
    pub base_url: Option<String>,
    /// Sent as `X-Webhook-Secret` when set.
    pub secret: Option<String>,
    pub timeout: Duration,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        WebhookConfig {
            base_url: None,
            secret: None,
            timeout: DEFAULT_WEBHOOK_TIMEOUT,
        }
    }
}

/// Notifier that triggers workflows over HTTP.
pub struct WebhookNotifier {
    config: WebhookConfig,
    agent: ureq::Agent,
}

impl WebhookNotifier {
    pub fn new(config: WebhookConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false)
            .build()
            .into();
        WebhookNotifier { config, agent }
    }

    pub fn is_configured(&self) -> bool {
        self.config.base_url.is_some()
    }

    /// Full webhook URL for an event, or `None` when no base URL is set.
    pub fn url_for(&self, event: WorkflowEvent) -> Option<String> {
        self.config
            .base_url
            .as_deref()
            .map(|base| format!("{}/webhook/{}", base.trim_end_matches('/'), event.path()))
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(
        &self,
        event: WorkflowEvent,
        payload: &NotifyPayload,
    ) -> Result<(), NotifyError> {
        let url = self.url_for(event).ok_or(NotifyError::NotConfigured)?;
        let agent = self.agent.clone();
        let secret = self.config.secret.clone();
        let body = serde_json::to_value(payload)
            .map_err(|e| NotifyError::Transport(format!("failed to encode payload: {}", e)))?;

        tracing::debug!(%event, %url, script_id = %payload.script_id, "triggering workflow");

        tokio::task::spawn_blocking(move || {
            let mut request = agent.post(&url);
            if let Some(ref secret) = secret {
                request = request.header(WEBHOOK_SECRET_HEADER, secret);
            }

            let response = request
                .send_json(&body)
                .map_err(|e| NotifyError::Transport(e.to_string()))?;

            let status = response.status();
            if status.is_success() {
                return Ok(());
            }
            let text = response
                .into_body()
                .read_to_string()
                .unwrap_or_default();
            Err(NotifyError::Rejected {
                status: status.as_u16(),
                body: text,
            })
        })
        .await
        .map_err(|e| NotifyError::Transport(format!("task join error: {}", e)))?
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
