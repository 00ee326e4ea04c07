//! statesync server entry point.
//!
//! Starts the Axum server with the sync WebSocket at the root and the
//! REST endpoints beside it.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use statesync::api;
use statesync::app_state::AppState;
use statesync::config::SyncConfig;
use statesync::domain::{EventBus, PeerRegistry, StateTransport};
use statesync::service::SyncService;
use statesync::ws::WsTransport;
use statesync::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = SyncConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting statesync");

    // Build domain layer
    let registry = Arc::new(PeerRegistry::new());
    let event_bus = EventBus::new(config.event_bus_capacity);

    // Build service layer and wire the WebSocket transport into it
    let sync_service = Arc::new(SyncService::new(registry, event_bus));
    let ws_transport = Arc::new(WsTransport::new(config.outbound_queue_capacity));
    sync_service
        .add_transport(Arc::clone(&ws_transport) as Arc<dyn StateTransport>)
        .await;

    // Build application state
    let app_state = AppState {
        sync_service,
        ws_transport,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
