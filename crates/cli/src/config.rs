//! Layered configuration: TOML file, then environment, then CLI flags.
//!
//! ```toml
//! data = "scripts.json"
//! tenant_id = "acme"
//!
//! [webhook]
//! base_url = "https://n8n.example.com"
//! secret = "..."
//! timeout_secs = 30
//!
//! [server]
//! port = 8080
//! api_key = "..."
//! rate_limit = 60
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use reelops_lifecycle::{WebhookConfig, DEFAULT_WEBHOOK_TIMEOUT};
use serde::Deserialize;

/// Default rate limit: 60 requests per minute per IP.
pub(crate) const DEFAULT_RATE_LIMIT: u64 = 60;

/// Default listen port.
pub(crate) const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("error reading config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("error parsing config '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct WebhookSection {
    pub(crate) base_url: Option<String>,
    pub(crate) secret: Option<String>,
    pub(crate) timeout_secs: u64,
}

impl Default for WebhookSection {
    fn default() -> Self {
        WebhookSection {
            base_url: None,
            secret: None,
            timeout_secs: DEFAULT_WEBHOOK_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct ServerSection {
    pub(crate) port: u16,
    pub(crate) api_key: Option<String>,
    pub(crate) rate_limit: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        ServerSection {
            port: DEFAULT_PORT,
            api_key: None,
            rate_limit: DEFAULT_RATE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct ReelopsConfig {
    /// JSON file holding the script records.
    pub(crate) data: Option<PathBuf>,
    /// Passed through to every workflow payload.
    pub(crate) tenant_id: Option<String>,
    pub(crate) webhook: WebhookSection,
    pub(crate) server: ServerSection,
}

impl ReelopsConfig {
    /// Load from an optional TOML file, then apply process environment.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Override fields from environment variables. Empty values are ignored.
    pub(crate) fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("N8N_BASE_URL") {
            self.webhook.base_url = Some(v);
        }
        if let Some(v) = get("N8N_WEBHOOK_SECRET") {
            self.webhook.secret = Some(v);
        }
        if let Some(v) = get("REELOPS_WEBHOOK_TIMEOUT_SECS") {
            self.webhook.timeout_secs = v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "REELOPS_WEBHOOK_TIMEOUT_SECS",
                value: v,
            })?;
        }
        if let Some(v) = get("REELOPS_API_KEY") {
            self.server.api_key = Some(v);
        }
        if let Some(v) = get("REELOPS_RATE_LIMIT") {
            self.server.rate_limit = v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "REELOPS_RATE_LIMIT",
                value: v,
            })?;
        }
        if let Some(v) = get("REELOPS_DATA") {
            self.data = Some(PathBuf::from(v));
        }
        if let Some(v) = get("REELOPS_TENANT_ID") {
            self.tenant_id = Some(v);
        }
        Ok(())
    }

    pub(crate) fn webhook_config(&self) -> WebhookConfig {
        WebhookConfig {
            base_url: self.webhook.base_url.clone(),
            secret: self.webhook.secret.clone(),
            timeout: Duration::from_secs(self.webhook.timeout_secs),
        }
    }
}
