//! `reelops serve` -- HTTP JSON API for the operator dashboard.
//!
//! Security features:
//! - CORS headers on all responses (permissive for local dev)
//! - Per-IP rate limiting (default: 60 req/min, configurable)
//! - Optional API key authentication via REELOPS_API_KEY
//!
//! Endpoints:
//! - GET   /health               - Server status (exempt from auth)
//! - GET   /api/scripts          - Paginated record list, `?status=&limit=&offset=`
//! - GET   /api/scripts/counts   - Record counts per status
//! - GET   /api/scripts/{id}     - One record
//! - PATCH /api/scripts/{id}     - Edit script content fields
//! - POST  /api/scripts/approve  - Approve a pending script
//! - POST  /api/videos/post      - Post a rendered video
//!
//! Successful responses are wrapped as `{"data": ...}`; failures as
//! `{"error": ..., "code": ...}`.

mod handlers;
mod middleware;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{middleware as axum_middleware, Json, Router};
use reelops_lifecycle::{Notifier, WebhookNotifier};
use reelops_storage::{InMemoryScriptStore, JsonFileScriptStore, ScriptStore};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use self::handlers::{
    handle_approve, handle_counts, handle_edit_script, handle_get_script, handle_health,
    handle_list_scripts, handle_not_found, handle_post_video,
};
use self::middleware::{auth_middleware, rate_limit_middleware};
use self::state::AppState;
use crate::config::ReelopsConfig;

/// Maximum request body size: 1 MB.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// How long in-flight HTTPS connections get to finish after Ctrl+C.
#[cfg(feature = "tls")]
const SHUTDOWN_GRACE: std::time::Duration = std::time::Duration::from_secs(10);

/// Construct a JSON error response with the given status, code, and message.
pub(crate) fn json_error(status: StatusCode, code: &str, message: &str) -> impl IntoResponse {
    (
        status,
        Json(serde_json::json!({ "error": message, "code": code })),
    )
}

/// Wrap a successful payload in the `{"data": ...}` envelope.
pub(crate) fn json_data<T: Serialize>(status: StatusCode, data: T) -> impl IntoResponse {
    (status, Json(serde_json::json!({ "data": data })))
}

/// Server options resolved from flags and config.
pub(crate) struct ServeOptions {
    pub(crate) port: u16,
    pub(crate) data: Option<PathBuf>,
    pub(crate) tls_cert: Option<PathBuf>,
    pub(crate) tls_key: Option<PathBuf>,
}

/// Routes and middleware over an existing state.
pub(crate) fn router(state: Arc<AppState>) -> Router {
    // Permissive for local dashboard development.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/scripts", get(handle_list_scripts))
        .route("/api/scripts/counts", get(handle_counts))
        .route("/api/scripts/approve", post(handle_approve))
        .route(
            "/api/scripts/{id}",
            get(handle_get_script).patch(handle_edit_script),
        )
        .route("/api/videos/post", post(handle_post_video))
        .fallback(handle_not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}

/// Start the HTTP server.
///
/// When TLS cert/key paths are provided, the server listens over HTTPS
/// using `axum-server` with rustls. Otherwise it uses plain HTTP. TLS paths
/// on a build without the `tls` feature are an error, never a downgrade.
pub(crate) async fn start_server(
    config: &ReelopsConfig,
    options: ServeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(not(feature = "tls"))]
    if options.tls_cert.is_some() || options.tls_key.is_some() {
        return Err("TLS requested but this build lacks the `tls` feature".into());
    }

    let store: Arc<dyn ScriptStore> = match &options.data {
        Some(path) => {
            let store = JsonFileScriptStore::open(path).await?;
            tracing::info!(path = %path.display(), "loaded script records");
            Arc::new(store)
        }
        None => {
            tracing::warn!("no data file given; serving an empty in-memory store");
            Arc::new(InMemoryScriptStore::new())
        }
    };

    let webhook = WebhookNotifier::new(config.webhook_config());
    if !webhook.is_configured() {
        tracing::warn!(
            "N8N_BASE_URL is not set; approve and post requests will fail and be reverted"
        );
    }
    let notifier: Arc<dyn Notifier> = Arc::new(webhook);

    let api_key = config.server.api_key.clone();
    if api_key.is_some() {
        tracing::info!("API key authentication enabled");
    }
    let state = Arc::new(AppState::new(
        store,
        notifier,
        config.tenant_id.clone(),
        config.server.rate_limit,
        api_key,
    ));
    tracing::info!(
        rate_limit = state.rate_limiter.max_requests(),
        "requests per minute per IP"
    );
    let app = router(state);

    let addr = format!("0.0.0.0:{}", options.port);

    // TLS support via axum-server + rustls (requires `tls` feature)
    #[cfg(feature = "tls")]
    if let (Some(cert_path), Some(key_path)) = (&options.tls_cert, &options.tls_key) {
        let tls =
            axum_server::tls_rustls::RustlsConfig::from_pem_file(cert_path, key_path).await?;
        let socket_addr: std::net::SocketAddr = addr.parse()?;
        let handle = axum_server::Handle::new();
        let shutdown = handle.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
        });
        tracing::info!("reelops listening on https://{}", addr);
        axum_server::bind_rustls(socket_addr, tls)
            .handle(handle)
            .serve(app.into_make_service_with_connect_info::<std::net::SocketAddr>())
            .await?;
        tracing::info!("server shut down");
        return Ok(());
    }
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("reelops listening on http://{}", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("server shut down");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("received shutdown signal");
}
