//! Editing the content fields of a script (save draft).
//!
//! Only `script_json`, `caption`, `hashtags`, and `music_track` may be
//! changed. Status-based read-only rules are a presentation concern and are
//! not checked here.

use reelops_storage::{ScriptJson, ScriptRecord, ScriptStore, ScriptUpdate};
use serde::Deserialize;

use crate::error::GuardError;

/// Fields accepted by a content edit. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EditableFields {
    #[serde(default)]
    pub script_json: Option<ScriptJson>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub hashtags: Option<Vec<String>>,
    #[serde(default)]
    pub music_track: Option<String>,
}

/// Names of the editable fields, for error messages.
pub const EDITABLE_FIELDS: [&str; 4] = ["script_json", "caption", "hashtags", "music_track"];

impl EditableFields {
    /// Convert to a store update, normalizing hashtags.
    ///
    /// Fails with `Validation` when no editable field is present.
    pub fn into_update(self) -> Result<ScriptUpdate, GuardError> {
        let update = ScriptUpdate {
            script_json: self.script_json,
            caption: self.caption,
            hashtags: self.hashtags.map(normalize_hashtags),
            music_track: self.music_track,
            ..Default::default()
        };
        if update.is_empty() {
            return Err(GuardError::Validation(format!(
                "No valid fields to update. Allowed fields: {}",
                EDITABLE_FIELDS.join(", ")
            )));
        }
        Ok(update)
    }
}

/// Trim, strip one leading `#`, drop empties, and dedupe keeping first
/// occurrence.
pub fn normalize_hashtags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let trimmed = tag.trim();
        let tag = trimmed.strip_prefix('#').unwrap_or(trimmed).trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Apply a content edit to one record and return it as written.
pub async fn edit_script<S: ScriptStore + ?Sized>(
    store: &S,
    id: &str,
    fields: EditableFields,
) -> Result<ScriptRecord, GuardError> {
    if id.trim().is_empty() {
        return Err(GuardError::Validation("Script ID is required".into()));
    }
    let update = fields.into_update()?;
    let record = store.update(id, update).await?;
    tracing::info!(script_id = id, "script content updated");
    Ok(record)
}

#[cfg(test)]
mod tests {
    use reelops_storage::{InMemoryScriptStore, ScriptStatus};

    use super::*;

    #[test]
    fn hashtags_are_normalized() {
        let tags = vec![
            " #viral ".to_string(),
            "fyp".to_string(),
            "#".to_string(),
            "viral".to_string(),
            "".to_string(),
            "#Growth".to_string(),
        ];
        assert_eq!(normalize_hashtags(tags), vec!["viral", "fyp", "Growth"]);
    }

    #[test]
    fn empty_edit_is_rejected_with_field_list() {
        let err = EditableFields::default().into_update().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("script_json, caption, hashtags, music_track"), "{msg}");
    }

    #[test]
    fn unknown_fields_do_not_count() {
        let fields: EditableFields =
            serde_json::from_value(serde_json::json!({"status": "Posted"})).unwrap();
        assert!(matches!(
            fields.into_update(),
            Err(GuardError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn edit_writes_only_content_fields() {
        let store =
            InMemoryScriptStore::with_records([ScriptRecord::new("s1", ScriptStatus::PendingScript)]);
        let record = edit_script(
            &store,
            "s1",
            EditableFields {
                caption: Some("Watch till the end".into()),
                hashtags: Some(vec!["#a".into(), "a".into()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(record.caption.as_deref(), Some("Watch till the end"));
        assert_eq!(record.hashtags, Some(vec!["a".to_string()]));
        assert_eq!(record.status, ScriptStatus::PendingScript);
    }

    #[tokio::test]
    async fn edit_missing_record_is_not_found() {
        let store = InMemoryScriptStore::new();
        let err = edit_script(
            &store,
            "ghost",
            EditableFields {
                music_track: Some("lofi".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GuardError::NotFound { .. }));
    }
}
