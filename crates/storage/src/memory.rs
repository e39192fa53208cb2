//! In-process script store backed by a `HashMap` behind a `tokio` lock.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::record::{ScriptPage, ScriptQuery, ScriptRecord, ScriptUpdate, StatusCounts};
use crate::traits::{paginate, ScriptStore};

/// A `ScriptStore` that keeps every record in memory.
///
/// Used by tests and by `reelops serve` when no data file is given. Records
/// are seeded up front since creation belongs to the external pipeline.
#[derive(Debug, Default)]
pub struct InMemoryScriptStore {
    records: RwLock<HashMap<String, ScriptRecord>>,
}

impl InMemoryScriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding the given records. A later record with a
    /// duplicate id replaces the earlier one.
    pub fn with_records(records: impl IntoIterator<Item = ScriptRecord>) -> Self {
        let records = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        InMemoryScriptStore {
            records: RwLock::new(records),
        }
    }

    /// Insert or replace a record, standing in for a pipeline write.
    pub async fn put(&self, record: ScriptRecord) {
        self.records.write().await.insert(record.id.clone(), record);
    }

    /// Clone out every record, in no particular order.
    pub async fn snapshot(&self) -> Vec<ScriptRecord> {
        self.records.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl ScriptStore for InMemoryScriptStore {
    async fn get(&self, id: &str) -> Result<ScriptRecord, StorageError> {
        self.records
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound { id: id.to_string() })
    }

    async fn update(&self, id: &str, update: ScriptUpdate) -> Result<ScriptRecord, StorageError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound { id: id.to_string() })?;
        record.apply(&update);
        Ok(record.clone())
    }

    async fn list(&self, query: &ScriptQuery) -> Result<ScriptPage, StorageError> {
        let records = self.records.read().await;
        let matching = records
            .values()
            .filter(|r| query.status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        Ok(paginate(matching, query))
    }

    async fn counts(&self) -> Result<StatusCounts, StorageError> {
        let records = self.records.read().await;
        Ok(StatusCounts::from_statuses(records.values().map(|r| r.status)))
    }
}
