//! HTTP gateway (Axum) in front of the decision engine.

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::check_copyright_handler;
pub use state::AppState;

/// Response header naming the engine (or error kind) behind a response.
pub const COPYGUARD_STATUS_HEADER: &str = "x-copyguard-status";

/// Largest accepted request body.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/check_copyright", post(check_copyright_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub engine: &'static str,
    pub uploads: &'static str,
    /// Informational: a missing corpus scans as empty.
    pub reference_corpus: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(COPYGUARD_STATUS_HEADER, HeaderValue::from_static("healthy"));

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let uploads = if state.upload_dir.is_dir() {
        "ready"
    } else {
        "error"
    };
    let reference_corpus = if state.reference_dir.is_dir() {
        "ready"
    } else {
        "missing"
    };

    let components = ComponentStatus {
        http: "ready",
        engine: state.engine.mode().as_str(),
        uploads,
        reference_corpus,
    };

    let is_ready = components.uploads == "ready";
    let (status_code, status_msg) = if is_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "pending")
    };

    let mut headers = HeaderMap::new();
    headers.insert(COPYGUARD_STATUS_HEADER, HeaderValue::from_static(status_msg));

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}
