//! REST API layer: route handlers and router composition.
//!
//! A small operational surface beside the sync socket: `GET /health` at
//! the root, state and peer endpoints under `/api/v1`.

pub mod handlers;

use axum::Router;

use crate::app_state::AppState;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system_routes())
}
