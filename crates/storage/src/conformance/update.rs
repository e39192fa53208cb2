use std::future::Future;

use super::{make_record, TestResult};
use crate::record::{ScriptJson, ScriptRecord, ScriptStatus, ScriptUpdate};
use crate::ScriptStore;

pub(super) async fn run_update_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: ScriptStore,
    F: Fn(Vec<ScriptRecord>) -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "update",
            "status_update_is_visible",
            status_update_is_visible(factory).await,
        ),
        TestResult::from_result(
            "update",
            "update_returns_written_record",
            update_returns_written_record(factory).await,
        ),
        TestResult::from_result(
            "update",
            "sparse_update_keeps_other_fields",
            sparse_update_keeps_other_fields(factory).await,
        ),
        TestResult::from_result(
            "update",
            "content_fields_update_together",
            content_fields_update_together(factory).await,
        ),
        TestResult::from_result(
            "update",
            "update_refreshes_updated_at",
            update_refreshes_updated_at(factory).await,
        ),
        TestResult::from_result(
            "update",
            "update_missing_is_not_found",
            update_missing_is_not_found(factory).await,
        ),
        TestResult::from_result(
            "update",
            "update_does_not_touch_other_records",
            update_does_not_touch_other_records(factory).await,
        ),
    ]
}

async fn status_update_is_visible<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ScriptStore,
    F: Fn(Vec<ScriptRecord>) -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory(vec![make_record("s1", ScriptStatus::PendingScript, 1)]).await;
    store
        .update("s1", ScriptUpdate::status(ScriptStatus::ScriptApproved))
        .await
        .map_err(|e| format!("update: {e}"))?;
    let got = store.get("s1").await.map_err(|e| format!("get: {e}"))?;
    if got.status != ScriptStatus::ScriptApproved {
        return Err(format!("expected Script Approved, got {}", got.status));
    }
    Ok(())
}

async fn update_returns_written_record<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ScriptStore,
    F: Fn(Vec<ScriptRecord>) -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory(vec![make_record("v1", ScriptStatus::VideoReadyPreview, 1)]).await;
    let written = store
        .update("v1", ScriptUpdate::processed(true))
        .await
        .map_err(|e| format!("update: {e}"))?;
    let got = store.get("v1").await.map_err(|e| format!("get: {e}"))?;
    if written != got {
        return Err(format!("returned {written:?} but stored {got:?}"));
    }
    if !got.processed {
        return Err("processed flag not written".into());
    }
    Ok(())
}

async fn sparse_update_keeps_other_fields<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ScriptStore,
    F: Fn(Vec<ScriptRecord>) -> Fut,
    Fut: Future<Output = S>,
{
    let mut seeded = make_record("s1", ScriptStatus::PendingScript, 1);
    seeded.caption = Some("keep me".into());
    seeded.video_url = Some("https://cdn.example/v.mp4".into());
    let store = factory(vec![seeded.clone()]).await;

    let got = store
        .update("s1", ScriptUpdate::processed(true))
        .await
        .map_err(|e| format!("update: {e}"))?;
    if got.status != seeded.status
        || got.caption != seeded.caption
        || got.video_url != seeded.video_url
        || got.created_at != seeded.created_at
    {
        return Err(format!("untouched fields changed: {got:?}"));
    }
    Ok(())
}

async fn content_fields_update_together<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ScriptStore,
    F: Fn(Vec<ScriptRecord>) -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory(vec![make_record("s1", ScriptStatus::PendingScript, 1)]).await;
    let script_json = ScriptJson {
        spoken_script: "Three things nobody tells you".into(),
        hook: "Stop scrolling".into(),
        ..Default::default()
    };
    let update = ScriptUpdate {
        script_json: Some(script_json.clone()),
        caption: Some("new caption".into()),
        hashtags: Some(vec!["a".into(), "b".into()]),
        music_track: Some("lofi-02".into()),
        ..Default::default()
    };
    store
        .update("s1", update)
        .await
        .map_err(|e| format!("update: {e}"))?;
    let got = store.get("s1").await.map_err(|e| format!("get: {e}"))?;
    if got.script_json.as_ref() != Some(&script_json)
        || got.caption.as_deref() != Some("new caption")
        || got.hashtags.as_deref() != Some(&["a".to_string(), "b".to_string()][..])
        || got.music_track.as_deref() != Some("lofi-02")
    {
        return Err(format!("content fields not all written: {got:?}"));
    }
    Ok(())
}

async fn update_refreshes_updated_at<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ScriptStore,
    F: Fn(Vec<ScriptRecord>) -> Fut,
    Fut: Future<Output = S>,
{
    let mut seeded = make_record("s1", ScriptStatus::PendingScript, 1);
    seeded.updated_at = "2000-01-01T00:00:00Z".into();
    let store = factory(vec![seeded]).await;
    let got = store
        .update("s1", ScriptUpdate::processed(false))
        .await
        .map_err(|e| format!("update: {e}"))?;
    if got.updated_at.as_str() <= "2000-01-01T00:00:00Z" {
        return Err(format!("updated_at not refreshed: {}", got.updated_at));
    }
    Ok(())
}

async fn update_missing_is_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ScriptStore,
    F: Fn(Vec<ScriptRecord>) -> Fut,
    Fut: Future<Output = S>,
{
    let store = factory(vec![make_record("s1", ScriptStatus::PendingScript, 1)]).await;
    match store
        .update("missing", ScriptUpdate::status(ScriptStatus::Failed))
        .await
    {
        Err(e) if e.is_not_found() => Ok(()),
        other => Err(format!("expected NotFound, got {other:?}")),
    }
}

async fn update_does_not_touch_other_records<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: ScriptStore,
    F: Fn(Vec<ScriptRecord>) -> Fut,
    Fut: Future<Output = S>,
{
    let other = make_record("s2", ScriptStatus::PendingScript, 2);
    let store = factory(vec![make_record("s1", ScriptStatus::PendingScript, 1), other.clone()]).await;
    store
        .update("s1", ScriptUpdate::status(ScriptStatus::ScriptApproved))
        .await
        .map_err(|e| format!("update: {e}"))?;
    let got = store.get("s2").await.map_err(|e| format!("get: {e}"))?;
    if got != other {
        return Err(format!("s2 changed: {got:?}"));
    }
    Ok(())
}
