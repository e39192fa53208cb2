use std::future::Future;

use super::{ids, make_record, one_of_each, TestResult};
use crate::record::{ScriptQuery, ScriptRecord, ScriptStatus, MAX_PAGE_LIMIT};
use crate::ScriptStore;

pub(super) async fn run_list_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ScriptStore,
    F: Fn(Vec<ScriptRecord>) -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "list",
            "list_orders_newest_first",
            list_orders_newest_first(factory).await,
        ),
        TestResult::from_result(
            "list",
            "list_orders_mixed_offsets_by_instant",
            list_orders_mixed_offsets_by_instant(factory).await,
        ),
        TestResult::from_result(
            "list",
            "list_filters_by_status",
            list_filters_by_status(factory).await,
        ),
        TestResult::from_result(
            "list",
            "list_paginates_with_total",
            list_paginates_with_total(factory).await,
        ),
        TestResult::from_result(
            "list",
            "list_offset_past_end_is_empty",
            list_offset_past_end_is_empty(factory).await,
        ),
        TestResult::from_result(
            "list",
            "list_clamps_limit",
            list_clamps_limit(factory).await,
        ),
    ]
}

async fn list_orders_newest_first<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ScriptStore,
    F: Fn(Vec<ScriptRecord>) -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory(one_of_each()).await;
    let page = store
        .list(&ScriptQuery::default())
        .await
        .map_err(|e| format!("list: {e}"))?;
    let got = ids(&page.scripts);
    let expected = vec!["failed", "posted", "ready", "approved", "pending"];
    if got != expected {
        return Err(format!("expected {expected:?}, got {got:?}"));
    }
    Ok(())
}

async fn list_orders_mixed_offsets_by_instant<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ScriptStore,
    F: Fn(Vec<ScriptRecord>) -> Fut,
    Fut: Future<Output = S>,
{
    let records = vec![
        // 07:00Z
        ScriptRecord::new("east", ScriptStatus::PendingScript)
            .with_created_at("2025-01-01T12:00:00+05:00"),
        ScriptRecord::new("utc", ScriptStatus::PendingScript)
            .with_created_at("2025-01-01T08:00:00Z"),
        // 07:30Z, nanosecond precision
        ScriptRecord::new("west", ScriptStatus::PendingScript)
            .with_created_at("2025-01-01T02:30:00.000000001-05:00"),
    ];
    let store = factory(records).await;
    let page = store
        .list(&ScriptQuery::default())
        .await
        .map_err(|e| format!("list: {e}"))?;
    let got = ids(&page.scripts);
    let expected = vec!["utc", "west", "east"];
    if got != expected {
        return Err(format!("expected {expected:?}, got {got:?}"));
    }
    Ok(())
}

async fn list_filters_by_status<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ScriptStore,
    F: Fn(Vec<ScriptRecord>) -> Fut,
    Fut: Future<Output = S>,
{
    let mut records = one_of_each();
    records.push(make_record("pending-2", ScriptStatus::PendingScript, 9));
    let store = factory(records).await;
    let page = store
        .list(&ScriptQuery {
            status: Some(ScriptStatus::PendingScript),
            ..Default::default()
        })
        .await
        .map_err(|e| format!("list: {e}"))?;
    let got = ids(&page.scripts);
    if got != vec!["pending-2", "pending"] || page.total != 2 {
        return Err(format!("expected two pending records, got {got:?} (total {})", page.total));
    }
    Ok(())
}

async fn list_paginates_with_total<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ScriptStore,
    F: Fn(Vec<ScriptRecord>) -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory(one_of_each()).await;
    let page = store
        .list(&ScriptQuery {
            status: None,
            limit: 2,
            offset: 1,
        })
        .await
        .map_err(|e| format!("list: {e}"))?;
    let got = ids(&page.scripts);
    if got != vec!["posted", "ready"] {
        return Err(format!("expected [posted, ready], got {got:?}"));
    }
    if page.total != 5 || page.limit != 2 || page.offset != 1 {
        return Err(format!(
            "page metadata wrong: total={} limit={} offset={}",
            page.total, page.limit, page.offset
        ));
    }
    Ok(())
}

async fn list_offset_past_end_is_empty<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ScriptStore,
    F: Fn(Vec<ScriptRecord>) -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory(one_of_each()).await;
    let page = store
        .list(&ScriptQuery {
            status: None,
            limit: 10,
            offset: 50,
        })
        .await
        .map_err(|e| format!("list: {e}"))?;
    if !page.scripts.is_empty() || page.total != 5 {
        return Err(format!(
            "expected empty page with total 5, got {} scripts (total {})",
            page.scripts.len(),
            page.total
        ));
    }
    Ok(())
}

async fn list_clamps_limit<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ScriptStore,
    F: Fn(Vec<ScriptRecord>) -> Fut,
    Fut: Future<Output = S>,
{
    let records = (0..(MAX_PAGE_LIMIT as u32 + 20))
        .map(|i| {
            ScriptRecord::new(format!("s{i:03}"), ScriptStatus::PendingScript)
                .with_created_at(format!("2025-01-01T{:02}:{:02}:00Z", i / 60, i % 60))
        })
        .collect();
    let store = factory(records).await;
    let page = store
        .list(&ScriptQuery {
            status: None,
            limit: 1000,
            offset: 0,
        })
        .await
        .map_err(|e| format!("list: {e}"))?;
    if page.scripts.len() != MAX_PAGE_LIMIT || page.limit != MAX_PAGE_LIMIT {
        return Err(format!(
            "expected {MAX_PAGE_LIMIT} scripts, got {} (limit {})",
            page.scripts.len(),
            page.limit
        ));
    }
    Ok(())
}
