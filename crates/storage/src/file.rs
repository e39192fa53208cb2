//! Script store persisted as a single JSON array on disk.
//!
//! The whole file is rewritten after every update: serialize, write to a
//! sibling temp file, then rename over the original. A failed write leaves
//! both the file and the in-memory copy unchanged.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::record::{ScriptPage, ScriptQuery, ScriptRecord, ScriptUpdate, StatusCounts};
use crate::traits::{paginate, ScriptStore};

/// A `ScriptStore` backed by a JSON file containing an array of records.
#[derive(Debug)]
pub struct JsonFileScriptStore {
    path: PathBuf,
    records: RwLock<Vec<ScriptRecord>>,
}

impl JsonFileScriptStore {
    /// Load the store from `path`. The file must exist and hold a JSON array.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| io_error(&path, source))?;
        let records: Vec<ScriptRecord> = serde_json::from_str(&raw)?;
        tracing::debug!(path = %path.display(), count = records.len(), "loaded script records");
        Ok(JsonFileScriptStore {
            path,
            records: RwLock::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, records: &[ScriptRecord]) -> Result<(), StorageError> {
        let encoded = serde_json::to_string_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, encoded)
            .await
            .map_err(|source| io_error(&tmp, source))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| io_error(&self.path, source))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[async_trait]
impl ScriptStore for JsonFileScriptStore {
    async fn get(&self, id: &str) -> Result<ScriptRecord, StorageError> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound { id: id.to_string() })
    }

    async fn update(&self, id: &str, update: ScriptUpdate) -> Result<ScriptRecord, StorageError> {
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StorageError::NotFound { id: id.to_string() })?;

        let previous = records[index].clone();
        records[index].apply(&update);
        if let Err(e) = self.persist(&records).await {
            records[index] = previous;
            return Err(e);
        }
        Ok(records[index].clone())
    }

    async fn list(&self, query: &ScriptQuery) -> Result<ScriptPage, StorageError> {
        let records = self.records.read().await;
        let matching = records
            .iter()
            .filter(|r| query.status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        Ok(paginate(matching, query))
    }

    async fn counts(&self) -> Result<StatusCounts, StorageError> {
        let records = self.records.read().await;
        Ok(StatusCounts::from_statuses(records.iter().map(|r| r.status)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ScriptStatus;

    fn write_records(dir: &Path, records: &[ScriptRecord]) -> PathBuf {
        let path = dir.join("scripts.json");
        std::fs::write(&path, serde_json::to_string(records).unwrap()).unwrap();
        path
    }

    #[tokio::test]
    async fn update_is_persisted_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_records(
            dir.path(),
            &[ScriptRecord::new("s1", ScriptStatus::PendingScript)],
        );

        let store = JsonFileScriptStore::open(&path).await.unwrap();
        store
            .update("s1", ScriptUpdate::status(ScriptStatus::ScriptApproved))
            .await
            .unwrap();

        let reopened = JsonFileScriptStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.get("s1").await.unwrap().status,
            ScriptStatus::ScriptApproved
        );
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn open_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonFileScriptStore::open(dir.path().join("nope.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }

    #[tokio::test]
    async fn open_malformed_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scripts.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = JsonFileScriptStore::open(&path).await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[tokio::test]
    async fn failed_persist_leaves_record_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_records(
            dir.path(),
            &[ScriptRecord::new("s1", ScriptStatus::VideoReadyPreview)],
        );
        let store = JsonFileScriptStore::open(&path).await.unwrap();

        // A directory where the temp file should go makes the write fail.
        std::fs::create_dir(path.with_extension("json.tmp")).unwrap();

        let err = store
            .update("s1", ScriptUpdate::processed(true))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
        assert!(!store.get("s1").await.unwrap().processed);
    }
}
