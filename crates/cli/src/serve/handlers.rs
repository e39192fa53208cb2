//! Route handlers: health, script queries, content edits, and the two
//! guarded transitions.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reelops_lifecycle::{edit_script, EditableFields, GuardError};
use reelops_storage::{ScriptQuery, ScriptStatus, StorageError};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::state::AppState;
use super::{json_data, json_error};

/// Body of the approve and post-video endpoints. Missing fields arrive as
/// empty strings and are rejected by the guard's own validation.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TransitionRequest {
    #[serde(default)]
    script_id: String,
    #[serde(default)]
    requested_by_user_id: String,
}

/// HTTP status for each guard failure.
pub(crate) fn status_for(err: &GuardError) -> StatusCode {
    match err {
        GuardError::Validation(_) => StatusCode::BAD_REQUEST,
        GuardError::NotFound { .. } => StatusCode::NOT_FOUND,
        GuardError::InvalidTransition { .. } => StatusCode::CONFLICT,
        GuardError::NotifyFailed { .. } => StatusCode::BAD_GATEWAY,
        GuardError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn guard_error_response(err: GuardError) -> Response {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::warn!(error = %err, code = err.code(), "request failed");
    }
    let mut body = serde_json::json!({
        "error": err.to_string(),
        "code": err.code(),
    });
    if let Some(current) = err.current_status() {
        body["current_status"] = serde_json::json!(current);
    }
    if let GuardError::NotifyFailed { reverted, .. } = &err {
        body["reverted"] = serde_json::json!(reverted);
    }
    (status, Json(body)).into_response()
}

fn storage_error_response(err: StorageError) -> Response {
    guard_error_response(GuardError::from(err))
}

/// Parse a JSON body, answering 400 on malformed input.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, Response> {
    serde_json::from_slice(body).map_err(|e| {
        json_error(
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
            &format!("Invalid JSON body: {}", e),
        )
        .into_response()
    })
}

fn parse_query(params: &HashMap<String, String>) -> Result<ScriptQuery, String> {
    let mut query = ScriptQuery::default();
    if let Some(raw) = params.get("status").filter(|s| !s.is_empty()) {
        query.status = Some(raw.parse::<ScriptStatus>().map_err(|e| e.to_string())?);
    }
    if let Some(raw) = params.get("limit") {
        query.limit = raw
            .parse()
            .map_err(|_| format!("invalid limit '{}': expected a non-negative integer", raw))?;
    }
    if let Some(raw) = params.get("offset") {
        query.offset = raw
            .parse()
            .map_err(|_| format!("invalid offset '{}': expected a non-negative integer", raw))?;
    }
    Ok(query)
}

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "not found")
}

/// GET /health
pub(crate) async fn handle_health() -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(response))
}

/// GET /api/scripts
pub(crate) async fn handle_list_scripts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let query = match parse_query(&params) {
        Ok(q) => q,
        Err(msg) => {
            return json_error(StatusCode::BAD_REQUEST, "BAD_REQUEST", &msg).into_response()
        }
    };
    match state.store.list(&query).await {
        Ok(page) => json_data(StatusCode::OK, page).into_response(),
        Err(e) => storage_error_response(e),
    }
}

/// GET /api/scripts/counts
pub(crate) async fn handle_counts(State(state): State<Arc<AppState>>) -> Response {
    match state.store.counts().await {
        Ok(counts) => json_data(StatusCode::OK, counts).into_response(),
        Err(e) => storage_error_response(e),
    }
}

/// GET /api/scripts/{id}
pub(crate) async fn handle_get_script(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.store.get(&id).await {
        Ok(record) => json_data(StatusCode::OK, record).into_response(),
        Err(e) => storage_error_response(e),
    }
}

/// PATCH /api/scripts/{id}
pub(crate) async fn handle_edit_script(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let fields: EditableFields = match parse_body(&body) {
        Ok(f) => f,
        Err(resp) => return resp,
    };
    match edit_script(state.store.as_ref(), &id, fields).await {
        Ok(record) => json_data(StatusCode::OK, record).into_response(),
        Err(e) => guard_error_response(e),
    }
}

/// POST /api/scripts/approve
pub(crate) async fn handle_approve(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let req: TransitionRequest = match parse_body(&body) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    match state
        .guard
        .approve(&req.script_id, &req.requested_by_user_id)
        .await
    {
        Ok(outcome) => json_data(
            StatusCode::OK,
            serde_json::json!({
                "message": "Script approved successfully. Video generation started.",
                "script_id": outcome.script_id,
                "new_status": outcome.status,
            }),
        )
        .into_response(),
        Err(e) => guard_error_response(e),
    }
}

/// POST /api/videos/post
pub(crate) async fn handle_post_video(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Response {
    let req: TransitionRequest = match parse_body(&body) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    match state
        .guard
        .post_video(&req.script_id, &req.requested_by_user_id)
        .await
    {
        Ok(outcome) => json_data(
            StatusCode::OK,
            serde_json::json!({
                "message": "Video posting initiated. It will be published shortly.",
                "script_id": outcome.script_id,
                "processed": outcome.processed,
            }),
        )
        .into_response(),
        Err(e) => guard_error_response(e),
    }
}
