//! HTTP middleware: rate limiting and API key authentication.

use std::sync::Arc;

use axum::extract::{ConnectInfo, State};
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::json_error;
use super::state::AppState;

/// Rate limiting middleware. Checks per-IP request rate before routing.
pub(crate) async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<std::net::SocketAddr>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    match state.rate_limiter.check(addr.ip()).await {
        Ok(()) => next.run(request).await,
        Err(retry_after) => {
            tracing::warn!(client = %addr.ip(), retry_after, "rate limit exceeded");
            let body = serde_json::json!({
                "error": "rate limit exceeded",
                "code": "RATE_LIMITED",
                "retry_after": retry_after,
            });
            (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response()
        }
    }
}

/// Extract the presented key from `Authorization: Bearer <key>` or
/// `X-API-Key: <key>`, in that order.
fn presented_key(request: &Request<axum::body::Body>) -> Option<&str> {
    let headers = request.headers();
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .or_else(|| headers.get("x-api-key").and_then(|v| v.to_str().ok()))
}

/// API key authentication middleware.
///
/// If an API key is configured, every request except `/health` must present
/// it. Missing key → 401, wrong key → 403.
pub(crate) async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.api_key.as_deref() else {
        return next.run(request).await;
    };

    // Load balancer health checks carry no credentials.
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    match presented_key(&request) {
        Some(key) if key == expected => next.run(request).await,
        Some(_) => json_error(StatusCode::FORBIDDEN, "FORBIDDEN", "invalid API key").into_response(),
        None => json_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "authentication required")
            .into_response(),
    }
}
