//! Sync orchestration: applies inbound diffs, promotes state, and fans
//! catch-up diffs out to stale peers.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::diff;
use crate::domain::sync_event::RejectReason;
use crate::domain::{
    EventBus, PeerId, PeerRegistry, StateDiff, StateSnapshot, StateTransport, SyncEvent,
};
use crate::error::SyncError;

/// Owns the authoritative document and drives the sync protocol.
///
/// The receive path ([`apply_remote`]) patches the sending peer's mirror
/// and, if the patch fits, promotes that mirror wholesale to the
/// authoritative state: whichever peer's envelope arrives last wins. The
/// send path ([`sync`]) walks every reachable peer and queues the minimal
/// diff that brings its mirror up to the authoritative state.
///
/// [`apply_remote`]: SyncService::apply_remote
/// [`sync`]: SyncService::sync
#[derive(Debug)]
pub struct SyncService {
    state: RwLock<StateSnapshot>,
    registry: Arc<PeerRegistry>,
    transports: RwLock<Vec<Arc<dyn StateTransport>>>,
    event_bus: EventBus,
}

impl SyncService {
    /// Creates a service holding the null document at time zero.
    #[must_use]
    pub fn new(registry: Arc<PeerRegistry>, event_bus: EventBus) -> Self {
        Self {
            state: RwLock::new(StateSnapshot::default()),
            registry,
            transports: RwLock::new(Vec::new()),
            event_bus,
        }
    }

    /// The event bus sync transitions are published on.
    #[must_use]
    pub const fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// The peer registry backing this service.
    #[must_use]
    pub fn registry(&self) -> Arc<PeerRegistry> {
        Arc::clone(&self.registry)
    }

    /// Registers a transport for [`sync`](Self::sync) to fan out through.
    pub async fn add_transport(&self, transport: Arc<dyn StateTransport>) {
        self.transports.write().await.push(transport);
    }

    /// Clone of the authoritative snapshot.
    pub async fn snapshot(&self) -> StateSnapshot {
        self.state.read().await.clone()
    }

    /// Records a peer arrival: creates its mirror and announces it.
    pub async fn peer_connected(&self, peer_id: PeerId) {
        let _ = self.registry.register(peer_id).await;
        self.event_bus.publish(SyncEvent::PeerConnected {
            peer_id,
            timestamp: Utc::now(),
        });
        tracing::info!(%peer_id, "peer connected");
    }

    /// Records a peer departure and drops its mirror.
    pub async fn peer_disconnected(&self, peer_id: PeerId) {
        if self.registry.remove(peer_id).await.is_ok() {
            self.event_bus.publish(SyncEvent::PeerDisconnected {
                peer_id,
                timestamp: Utc::now(),
            });
            tracing::info!(%peer_id, "peer disconnected");
        }
    }

    /// Applies an inbound envelope from `peer_id`.
    ///
    /// The diff lands on that peer's mirror; when it fits, the mirror is
    /// promoted wholesale to the authoritative state and `Ok(true)` comes
    /// back. Envelopes whose `time` is not newer than the mirror are
    /// discarded as stale with `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Diff`] when the diff does not fit the mirror.
    /// Neither the mirror nor the authoritative state is modified.
    pub async fn apply_remote(
        &self,
        peer_id: PeerId,
        envelope: StateDiff,
    ) -> Result<bool, SyncError> {
        let entry_lock = self.registry.register(peer_id).await;
        let mut entry = entry_lock.write().await;

        if envelope.time <= entry.mirror.time {
            drop(entry);
            self.event_bus.publish(SyncEvent::DiffRejected {
                peer_id,
                reason: RejectReason::Stale,
                timestamp: Utc::now(),
            });
            tracing::debug!(
                %peer_id,
                time = envelope.time,
                "stale envelope discarded"
            );
            return Ok(false);
        }

        // Patch a scratch copy so a bad diff cannot leave the mirror
        // half-applied.
        let mut patched = entry.mirror.value.clone();
        if let Err(err) = diff::apply(&mut patched, &envelope.diff) {
            drop(entry);
            self.event_bus.publish(SyncEvent::DiffRejected {
                peer_id,
                reason: RejectReason::ApplyFailed,
                timestamp: Utc::now(),
            });
            tracing::warn!(%peer_id, error = %err, "inbound diff does not fit the peer mirror");
            return Err(SyncError::Diff(err));
        }

        entry.mirror = StateSnapshot::new(patched, envelope.time);
        entry.diffs_received = entry.diffs_received.saturating_add(1);
        entry.last_active_at = Utc::now();
        let mirror = entry.mirror.clone();
        drop(entry);

        *self.state.write().await = mirror;
        self.event_bus.publish(SyncEvent::DiffApplied {
            peer_id,
            time: envelope.time,
            timestamp: Utc::now(),
        });
        tracing::debug!(%peer_id, time = envelope.time, "diff applied and promoted");
        Ok(true)
    }

    /// Replaces the authoritative document outright (local authoring
    /// path). Mirrors are untouched; call [`sync`](Self::sync) afterwards
    /// to push the change out.
    pub async fn update_local(&self, value: Value, time: u64) {
        *self.state.write().await = StateSnapshot::new(value, time);
    }

    /// Pushes catch-up diffs to every reachable stale peer.
    ///
    /// A peer's mirror advances only when its envelope was queued, so a
    /// full or dead queue leaves the peer stale and it is retried on the
    /// next call. Returns how many peers were brought current.
    pub async fn sync(&self) -> usize {
        let state = self.snapshot().await;
        let transports = self.transports.read().await.clone();

        let mut synced = 0usize;
        for transport in &transports {
            for peer_id in transport.peers() {
                let entry_lock = self.registry.register(peer_id).await;
                let mut entry = entry_lock.write().await;
                if entry.mirror.time >= state.time {
                    continue;
                }

                let envelope = StateDiff::new(
                    diff::diff(&entry.mirror.value, &state.value),
                    state.time,
                );
                match transport.send_diff(peer_id, &envelope) {
                    Ok(()) => {
                        entry.mirror = state.clone();
                        entry.diffs_sent = entry.diffs_sent.saturating_add(1);
                        entry.last_active_at = Utc::now();
                        synced += 1;
                        self.event_bus.publish(SyncEvent::StatePushed {
                            peer_id,
                            time: state.time,
                            timestamp: Utc::now(),
                        });
                    }
                    Err(err) => {
                        tracing::warn!(%peer_id, error = %err, "catch-up diff not queued");
                    }
                }
            }
        }

        if synced > 0 {
            tracing::debug!(synced, time = state.time, "peers brought current");
        }
        synced
    }
}
