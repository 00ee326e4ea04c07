//! REST endpoint handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::app_state::AppState;
use crate::domain::state::now_millis;

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// `GET /state` — The authoritative snapshot, `{"value": ..., "time": ...}`.
pub async fn get_state_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.sync_service.snapshot().await;
    (StatusCode::OK, Json(snapshot))
}

/// `PUT /state` response.
#[derive(Debug, Serialize)]
struct StateUpdatedResponse {
    time: u64,
    peers_synced: usize,
}

/// `PUT /state` — Replace the document and push it to every peer.
///
/// The body is the new document verbatim. The server stamps it with the
/// current wall clock and fans the change out exactly as if a peer had
/// sent it.
pub async fn put_state_handler(
    State(state): State<AppState>,
    Json(document): Json<Value>,
) -> impl IntoResponse {
    // Wall clocks can stand still within a millisecond; versions must not.
    let snapshot = state.sync_service.snapshot().await;
    let time = now_millis().max(snapshot.time.saturating_add(1));

    state.sync_service.update_local(document, time).await;
    let peers_synced = state.sync_service.sync().await;
    tracing::info!(time, peers_synced, "document replaced via REST");

    (StatusCode::OK, Json(StateUpdatedResponse { time, peers_synced }))
}

/// `GET /peers` — Mirror versions and traffic counters per peer.
pub async fn list_peers_handler(State(state): State<AppState>) -> impl IntoResponse {
    let peers = state.sync_service.registry().list().await;
    (StatusCode::OK, Json(peers))
}

/// Sync routes mounted under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/state", get(get_state_handler).put(put_state_handler))
        .route("/peers", get(list_peers_handler))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn system_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
