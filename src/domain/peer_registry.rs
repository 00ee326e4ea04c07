//! Concurrent peer storage with per-peer fine-grained locking.
//!
//! [`PeerRegistry`] stores every known peer in a `HashMap` where each
//! entry is individually protected by a [`tokio::sync::RwLock`]. This
//! allows concurrent reads on the same peer and concurrent writes on
//! different peers.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::peer_entry::{PeerEntry, PeerSummary};
use super::peer_id::PeerId;
use crate::error::SyncError;

/// Central store for all known peers and their mirrors.
///
/// Uses a `RwLock<HashMap<...>>` for the outer map and per-entry
/// `Arc<RwLock<PeerEntry>>` for fine-grained per-peer locking.
///
/// # Concurrency
///
/// - Multiple tasks may read the same peer concurrently.
/// - Writes to different peers are concurrent.
/// - Writes to the same peer are serialized.
#[derive(Debug)]
pub struct PeerRegistry {
    peers: RwLock<HashMap<PeerId, Arc<RwLock<PeerEntry>>>>,
}

impl PeerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            peers: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the entry for a peer, creating a fresh one on first
    /// contact. Registering an already known peer is a no-op that hands
    /// back the existing entry.
    pub async fn register(&self, peer_id: PeerId) -> Arc<RwLock<PeerEntry>> {
        let mut map = self.peers.write().await;
        Arc::clone(
            map.entry(peer_id)
                .or_insert_with(|| Arc::new(RwLock::new(PeerEntry::new(peer_id)))),
        )
    }

    /// Returns a shared reference to the peer entry behind its own lock.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::PeerNotFound`] if the peer was never
    /// registered or has been removed.
    pub async fn get(&self, peer_id: PeerId) -> Result<Arc<RwLock<PeerEntry>>, SyncError> {
        let map = self.peers.read().await;
        map.get(&peer_id)
            .cloned()
            .ok_or(SyncError::PeerNotFound(*peer_id.as_uuid()))
    }

    /// Drops a peer and its mirror. Tasks still holding the entry keep a
    /// valid reference; it is simply no longer reachable for syncs.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::PeerNotFound`] if the peer is not registered.
    pub async fn remove(&self, peer_id: PeerId) -> Result<(), SyncError> {
        let mut map = self.peers.write().await;
        map.remove(&peer_id)
            .map(|_| ())
            .ok_or(SyncError::PeerNotFound(*peer_id.as_uuid()))
    }

    /// Returns summaries of all registered peers.
    pub async fn list(&self) -> Vec<PeerSummary> {
        let map = self.peers.read().await;
        let mut summaries = Vec::with_capacity(map.len());
        for entry_lock in map.values() {
            let entry = entry_lock.read().await;
            summaries.push(PeerSummary::from(&*entry));
        }
        summaries
    }

    /// Returns the number of registered peers.
    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    /// Returns `true` if no peers are registered.
    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }
}

impl Default for PeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
