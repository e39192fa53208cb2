use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a script record.
///
/// Serialized with its display text (`"Video Ready (Preview)"`), which is the
/// value stored in the `status` column shared with the automation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScriptStatus {
    #[serde(rename = "Pending Script")]
    PendingScript,
    #[serde(rename = "Script Approved")]
    ScriptApproved,
    #[serde(rename = "Video Ready (Preview)")]
    VideoReadyPreview,
    #[serde(rename = "Posted")]
    Posted,
    #[serde(rename = "Failed")]
    Failed,
}

impl ScriptStatus {
    /// Every status, in lifecycle order (`Failed` last).
    pub const ALL: [ScriptStatus; 5] = [
        ScriptStatus::PendingScript,
        ScriptStatus::ScriptApproved,
        ScriptStatus::VideoReadyPreview,
        ScriptStatus::Posted,
        ScriptStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptStatus::PendingScript => "Pending Script",
            ScriptStatus::ScriptApproved => "Script Approved",
            ScriptStatus::VideoReadyPreview => "Video Ready (Preview)",
            ScriptStatus::Posted => "Posted",
            ScriptStatus::Failed => "Failed",
        }
    }

    /// Comma-separated list of every status, for error messages.
    pub fn valid_values() -> String {
        Self::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ScriptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the five status values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid status '{0}'. Must be one of: {list}", list = ScriptStatus::valid_values())]
pub struct UnknownStatus(pub String);

impl FromStr for ScriptStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Generated script body, as produced by the generation workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptJson {
    #[serde(default)]
    pub spoken_script: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub on_screen_text: String,
    #[serde(default)]
    pub music_track: String,
    #[serde(default)]
    pub hook: String,
}

/// One row of the scripts table.
///
/// Records are created by the external pipeline; this crate only reads them
/// and applies [`ScriptUpdate`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptRecord {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub status: ScriptStatus,
    #[serde(default)]
    pub processed: bool,
    #[serde(default)]
    pub source_video_url: Option<String>,
    #[serde(default)]
    pub source_hash: Option<String>,
    #[serde(default)]
    pub script_json: Option<ScriptJson>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub hashtags: Option<Vec<String>>,
    #[serde(default)]
    pub music_track: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    /// RFC 3339 timestamp string.
    #[serde(default)]
    pub posted_at: Option<String>,
    #[serde(default)]
    pub platforms: Option<Vec<String>>,
    /// RFC 3339 timestamp string.
    pub created_at: String,
    /// RFC 3339 timestamp string.
    pub updated_at: String,
}

impl ScriptRecord {
    /// A bare record with the given id and status, `processed = false`, and
    /// both timestamps set to now.
    pub fn new(id: impl Into<String>, status: ScriptStatus) -> Self {
        let now = now_rfc3339();
        ScriptRecord {
            id: id.into(),
            user_id: None,
            status,
            processed: false,
            source_video_url: None,
            source_hash: None,
            script_json: None,
            caption: None,
            hashtags: None,
            music_track: None,
            video_url: None,
            error_message: None,
            posted_at: None,
            platforms: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn with_processed(mut self, processed: bool) -> Self {
        self.processed = processed;
        self
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = created_at.into();
        self
    }

    /// Apply a sparse update in place and refresh `updated_at`.
    pub fn apply(&mut self, update: &ScriptUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(processed) = update.processed {
            self.processed = processed;
        }
        if let Some(ref script_json) = update.script_json {
            self.script_json = Some(script_json.clone());
        }
        if let Some(ref caption) = update.caption {
            self.caption = Some(caption.clone());
        }
        if let Some(ref hashtags) = update.hashtags {
            self.hashtags = Some(hashtags.clone());
        }
        if let Some(ref music_track) = update.music_track {
            self.music_track = Some(music_track.clone());
        }
        self.updated_at = now_rfc3339();
    }
}

/// A sparse set of field writes. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ScriptStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_json: Option<ScriptJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_track: Option<String>,
}

impl ScriptUpdate {
    pub fn status(status: ScriptStatus) -> Self {
        ScriptUpdate {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn processed(processed: bool) -> Self {
        ScriptUpdate {
            processed: Some(processed),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == ScriptUpdate::default()
    }
}

/// Default page size for [`ScriptQuery`].
pub const DEFAULT_PAGE_LIMIT: usize = 50;

/// Upper bound on page size; larger requests are clamped.
pub const MAX_PAGE_LIMIT: usize = 100;

/// Listing parameters. Results are ordered by `created_at`, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptQuery {
    pub status: Option<ScriptStatus>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for ScriptQuery {
    fn default() -> Self {
        ScriptQuery {
            status: None,
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl ScriptQuery {
    /// The effective page size after clamping to `1..=MAX_PAGE_LIMIT`.
    pub fn effective_limit(&self) -> usize {
        self.limit.clamp(1, MAX_PAGE_LIMIT)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptPage {
    pub scripts: Vec<ScriptRecord>,
    /// Number of records matching the filter, ignoring pagination.
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Record counts per status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending_script: usize,
    pub script_approved: usize,
    pub video_ready_preview: usize,
    pub posted: usize,
    pub failed: usize,
    pub total: usize,
}

impl StatusCounts {
    pub fn from_statuses(statuses: impl IntoIterator<Item = ScriptStatus>) -> Self {
        let mut counts = StatusCounts {
            pending_script: 0,
            script_approved: 0,
            video_ready_preview: 0,
            posted: 0,
            failed: 0,
            total: 0,
        };
        for status in statuses {
            match status {
                ScriptStatus::PendingScript => counts.pending_script += 1,
                ScriptStatus::ScriptApproved => counts.script_approved += 1,
                ScriptStatus::VideoReadyPreview => counts.video_ready_preview += 1,
                ScriptStatus::Posted => counts.posted += 1,
                ScriptStatus::Failed => counts.failed += 1,
            }
            counts.total += 1;
        }
        counts
    }

    pub fn get(&self, status: ScriptStatus) -> usize {
        match status {
            ScriptStatus::PendingScript => self.pending_script,
            ScriptStatus::ScriptApproved => self.script_approved,
            ScriptStatus::VideoReadyPreview => self.video_ready_preview,
            ScriptStatus::Posted => self.posted,
            ScriptStatus::Failed => self.failed,
        }
    }
}

/// Current UTC time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_as_display_text() {
        let json = serde_json::to_string(&ScriptStatus::VideoReadyPreview).unwrap();
        assert_eq!(json, "\"Video Ready (Preview)\"");
        let back: ScriptStatus = serde_json::from_str("\"Pending Script\"").unwrap();
        assert_eq!(back, ScriptStatus::PendingScript);
    }

    #[test]
    fn status_from_str_rejects_unknown() {
        assert_eq!(
            "Script Approved".parse::<ScriptStatus>(),
            Ok(ScriptStatus::ScriptApproved)
        );
        let err = "approved".parse::<ScriptStatus>().unwrap_err();
        assert!(err.to_string().contains("Must be one of: Pending Script"));
    }

    #[test]
    fn apply_only_touches_set_fields() {
        let mut record = ScriptRecord::new("s1", ScriptStatus::PendingScript);
        record.caption = Some("old".into());
        record.apply(&ScriptUpdate::processed(true));
        assert!(record.processed);
        assert_eq!(record.status, ScriptStatus::PendingScript);
        assert_eq!(record.caption.as_deref(), Some("old"));
    }

    #[test]
    fn record_deserializes_with_missing_optional_fields() {
        let record: ScriptRecord = serde_json::from_value(serde_json::json!({
            "id": "s1",
            "status": "Posted",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z",
        }))
        .unwrap();
        assert_eq!(record.status, ScriptStatus::Posted);
        assert!(!record.processed);
        assert!(record.hashtags.is_none());
    }

    #[test]
    fn query_limit_is_clamped() {
        let q = ScriptQuery {
            limit: 500,
            ..Default::default()
        };
        assert_eq!(q.effective_limit(), MAX_PAGE_LIMIT);
        let q = ScriptQuery {
            limit: 0,
            ..Default::default()
        };
        assert_eq!(q.effective_limit(), 1);
    }

    #[test]
    fn counts_cover_every_status() {
        let counts = StatusCounts::from_statuses([
            ScriptStatus::PendingScript,
            ScriptStatus::PendingScript,
            ScriptStatus::Failed,
        ]);
        assert_eq!(counts.get(ScriptStatus::PendingScript), 2);
        assert_eq!(counts.get(ScriptStatus::Failed), 1);
        assert_eq!(counts.get(ScriptStatus::Posted), 0);
        assert_eq!(counts.total, 3);
    }
}
