use async_trait::async_trait;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::StorageError;
use crate::record::{ScriptPage, ScriptQuery, ScriptRecord, ScriptUpdate, StatusCounts};

/// The storage trait for script record backends.
///
/// A `ScriptStore` gives read/update access to the scripts table. Records are
/// created by the external generation pipeline, so there is no insert here;
/// backends are seeded from whatever the pipeline has written.
///
/// ## Consistency
///
/// There is no transaction spanning a `get` and a following `update`. Callers
/// that check a precondition and then write (the transition guard) accept
/// that a concurrent writer can land in between. Each individual call must be
/// atomic: an `update` is either fully applied or not at all.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` to be used in axum
/// application state and across async task boundaries.
#[async_trait]
pub trait ScriptStore: Send + Sync + 'static {
    /// Read one record.
    ///
    /// Returns `Err(StorageError::NotFound)` if no record has this id.
    async fn get(&self, id: &str) -> Result<ScriptRecord, StorageError>;

    /// Apply a sparse update and return the record as written.
    ///
    /// `updated_at` is refreshed on every successful call. Returns
    /// `Err(StorageError::NotFound)` if no record has this id.
    async fn update(&self, id: &str, update: ScriptUpdate) -> Result<ScriptRecord, StorageError>;

    /// List records, newest `created_at` first, optionally filtered by status.
    ///
    /// `total` in the returned page counts all matches before pagination.
    async fn list(&self, query: &ScriptQuery) -> Result<ScriptPage, StorageError>;

    /// Count records per status.
    async fn counts(&self) -> Result<StatusCounts, StorageError>;
}

#[async_trait]
impl<S: ScriptStore + ?Sized> ScriptStore for std::sync::Arc<S> {
    async fn get(&self, id: &str) -> Result<ScriptRecord, StorageError> {
        (**self).get(id).await
    }

    async fn update(&self, id: &str, update: ScriptUpdate) -> Result<ScriptRecord, StorageError> {
        (**self).update(id, update).await
    }

    async fn list(&self, query: &ScriptQuery) -> Result<ScriptPage, StorageError> {
        (**self).list(query).await
    }

    async fn counts(&self) -> Result<StatusCounts, StorageError> {
        (**self).counts().await
    }
}

/// `created_at` as an instant, so `+05:00` and `Z` stamps order correctly.
/// Unparseable stamps sort after every parseable one, by raw string.
fn created_instant(record: &ScriptRecord) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(&record.created_at, &Rfc3339).ok()
}

/// Paginate an already-filtered set of records the way every backend should:
/// newest first, clamped limit, offset past the end yields an empty page.
pub(crate) fn paginate(mut matching: Vec<ScriptRecord>, query: &ScriptQuery) -> ScriptPage {
    matching.sort_by_cached_key(|r| {
        (
            std::cmp::Reverse((created_instant(r), r.created_at.clone())),
            r.id.clone(),
        )
    });
    let total = matching.len();
    let limit = query.effective_limit();
    let scripts = matching
        .into_iter()
        .skip(query.offset)
        .take(limit)
        .collect();
    ScriptPage {
        scripts,
        total,
        limit,
        offset: query.offset,
    }
}
