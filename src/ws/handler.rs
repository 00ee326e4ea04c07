//! Axum WebSocket upgrade handler.

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::domain::PeerId;

/// `GET /` — Upgrade HTTP connection to the sync WebSocket.
///
/// Allocates a [`PeerId`], registers the peer's outbound queue, and runs
/// one sync pass so a newcomer has the current document queued before any
/// further edits arrive.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let peer_id = PeerId::new();
    let outbound = state.ws_transport.register(peer_id);
    let service = std::sync::Arc::clone(&state.sync_service);
    let transport = std::sync::Arc::clone(&state.ws_transport);

    service.peer_connected(peer_id).await;
    service.sync().await;

    ws.on_upgrade(move |socket| run_connection(socket, peer_id, outbound, service, transport))
}
