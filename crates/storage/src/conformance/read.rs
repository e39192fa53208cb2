use std::future::Future;

use super::{make_record, one_of_each, TestResult};
use crate::record::{ScriptRecord, ScriptStatus};
use crate::{ScriptStore, StorageError};

pub(super) async fn run_read_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ScriptStore,
    F: Fn(Vec<ScriptRecord>) -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "read",
            "get_returns_seeded_record",
            get_returns_seeded_record(factory).await,
        ),
        TestResult::from_result(
            "read",
            "get_missing_is_not_found",
            get_missing_is_not_found(factory).await,
        ),
        TestResult::from_result(
            "read",
            "get_empty_store_is_not_found",
            get_empty_store_is_not_found(factory).await,
        ),
        TestResult::from_result(
            "read",
            "counts_tally_every_status",
            counts_tally_every_status(factory).await,
        ),
        TestResult::from_result(
            "read",
            "counts_empty_store_all_zero",
            counts_empty_store_all_zero(factory).await,
        ),
    ]
}

async fn get_returns_seeded_record<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ScriptStore,
    F: Fn(Vec<ScriptRecord>) -> Fut,
    Fut: Future<Output = S>,
{
    let mut seeded = make_record("s1", ScriptStatus::VideoReadyPreview, 1);
    seeded.caption = Some("hello".into());
    seeded.hashtags = Some(vec!["viral".into()]);
    let store = factory(vec![seeded.clone()]).await;

    let got = store.get("s1").await.map_err(|e| format!("get: {e}"))?;
    if got != seeded {
        return Err(format!("expected {seeded:?}, got {got:?}"));
    }
    Ok(())
}

async fn get_missing_is_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ScriptStore,
    F: Fn(Vec<ScriptRecord>) -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory(one_of_each()).await;
    match store.get("missing").await {
        Err(StorageError::NotFound { id }) if id == "missing" => Ok(()),
        Err(StorageError::NotFound { id }) => Err(format!("NotFound carried id '{id}'")),
        Err(e) => Err(format!("expected NotFound, got {e}")),
        Ok(r) => Err(format!("expected NotFound, got record {}", r.id)),
    }
}

async fn get_empty_store_is_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ScriptStore,
    F: Fn(Vec<ScriptRecord>) -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory(Vec::new()).await;
    match store.get("s1").await {
        Err(e) if e.is_not_found() => Ok(()),
        other => Err(format!("expected NotFound, got {other:?}")),
    }
}

async fn counts_tally_every_status<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ScriptStore,
    F: Fn(Vec<ScriptRecord>) -> Fut,
    Fut: Future<Output = S>,
{
    let mut records = one_of_each();
    records.push(make_record("pending-2", ScriptStatus::PendingScript, 6));
    let store = factory(records).await;

    let counts = store.counts().await.map_err(|e| format!("counts: {e}"))?;
    let expected = [
        (ScriptStatus::PendingScript, 2),
        (ScriptStatus::ScriptApproved, 1),
        (ScriptStatus::VideoReadyPreview, 1),
        (ScriptStatus::Posted, 1),
        (ScriptStatus::Failed, 1),
    ];
    for (status, n) in expected {
        if counts.get(status) != n {
            return Err(format!(
                "count for {status}: expected {n}, got {}",
                counts.get(status)
            ));
        }
    }
    if counts.total != 6 {
        return Err(format!("total: expected 6, got {}", counts.total));
    }
    Ok(())
}

async fn counts_empty_store_all_zero<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ScriptStore,
    F: Fn(Vec<ScriptRecord>) -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory(Vec::new()).await;
    let counts = store.counts().await.map_err(|e| format!("counts: {e}"))?;
    if counts.total != 0 || ScriptStatus::ALL.iter().any(|s| counts.get(*s) != 0) {
        return Err(format!("expected all zero, got {counts:?}"));
    }
    Ok(())
}
