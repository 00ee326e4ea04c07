//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::SyncService;
use crate::ws::WsTransport;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Sync service owning the authoritative document.
    pub sync_service: Arc<SyncService>,
    /// Outbound queues for connected WebSocket peers.
    pub ws_transport: Arc<WsTransport>,
}
