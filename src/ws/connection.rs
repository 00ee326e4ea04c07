//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single connection: inbound text
//! frames are parsed as diff envelopes and fed to the sync service,
//! envelopes queued by the service are drained onto the socket.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::WsTransport;
use crate::domain::sync_event::RejectReason;
use crate::domain::{PeerId, StateDiff, SyncEvent};
use crate::service::SyncService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads envelopes from the peer and hands them to the service; an
///   accepted envelope triggers a fan-out sync to everyone else.
/// - Drains the peer's outbound queue onto the socket.
///
/// On exit the peer is unregistered from the transport and its mirror is
/// dropped.
pub async fn run_connection(
    socket: WebSocket,
    peer_id: PeerId,
    mut outbound: mpsc::Receiver<StateDiff>,
    service: Arc<SyncService>,
    transport: Arc<WsTransport>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            // Incoming frame from the peer
            frame = ws_rx.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        handle_text_frame(&text, peer_id, &service).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        tracing::warn!(%peer_id, error = %err, "ws read failed");
                        break;
                    }
                }
            }
            // Catch-up envelope queued by the service
            envelope = outbound.recv() => {
                let Some(envelope) = envelope else { break };
                let json = serde_json::to_string(&envelope).unwrap_or_default();
                if ws_tx.send(Message::text(json)).await.is_err() {
                    break;
                }
            }
        }
    }

    transport.unregister(peer_id);
    service.peer_disconnected(peer_id).await;
    tracing::debug!(%peer_id, "ws connection closed");
}

/// Parses one inbound text frame and routes it through the service.
///
/// Frames that are not diff envelopes are flagged and dropped without
/// closing the connection. Stale and ill-fitting envelopes are already
/// flagged inside the service.
async fn handle_text_frame(text: &str, peer_id: PeerId, service: &SyncService) {
    let envelope = match serde_json::from_str::<StateDiff>(text) {
        Ok(envelope) => envelope,
        Err(err) => {
            tracing::warn!(%peer_id, error = %err, "frame is not a diff envelope");
            service.event_bus().publish(SyncEvent::DiffRejected {
                peer_id,
                reason: RejectReason::Malformed,
                timestamp: chrono::Utc::now(),
            });
            return;
        }
    };

    if let Ok(true) = service.apply_remote(peer_id, envelope).await {
        service.sync().await;
    }
}
