//! Per-peer bookkeeping: the mirror snapshot and connection metadata.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::peer_id::PeerId;
use super::state::StateSnapshot;

/// Everything the server tracks about one peer.
///
/// `mirror` is the last [`StateSnapshot`] the peer is assumed to hold. It
/// advances when the peer sends an accepted diff and when a catch-up push
/// to the peer is queued. A fresh peer mirrors the null document at time
/// zero, so its first catch-up carries the whole state.
#[derive(Debug, Clone)]
pub struct PeerEntry {
    /// Peer identifier.
    pub peer_id: PeerId,
    /// Last state the peer is assumed to hold.
    pub mirror: StateSnapshot,
    /// When the peer connected.
    pub connected_at: DateTime<Utc>,
    /// Last time a diff moved in either direction.
    pub last_active_at: DateTime<Utc>,
    /// Inbound envelopes accepted from this peer.
    pub diffs_received: u64,
    /// Outbound envelopes queued to this peer.
    pub diffs_sent: u64,
}

impl PeerEntry {
    /// Fresh entry mirroring the null document.
    #[must_use]
    pub fn new(peer_id: PeerId) -> Self {
        let now = Utc::now();
        Self {
            peer_id,
            mirror: StateSnapshot::default(),
            connected_at: now,
            last_active_at: now,
            diffs_received: 0,
            diffs_sent: 0,
        }
    }
}

/// Serializable projection of a [`PeerEntry`] for the REST peer list.
#[derive(Debug, Clone, Serialize)]
pub struct PeerSummary {
    /// Peer identifier.
    pub peer_id: PeerId,
    /// State version the peer is assumed to hold.
    pub mirror_time: u64,
    /// When the peer connected.
    pub connected_at: DateTime<Utc>,
    /// Last time a diff moved in either direction.
    pub last_active_at: DateTime<Utc>,
    /// Inbound envelopes accepted from this peer.
    pub diffs_received: u64,
    /// Outbound envelopes queued to this peer.
    pub diffs_sent: u64,
}

impl From<&PeerEntry> for PeerSummary {
    fn from(entry: &PeerEntry) -> Self {
        Self {
            peer_id: entry.peer_id,
            mirror_time: entry.mirror.time,
            connected_at: entry.connected_at,
            last_active_at: entry.last_active_at,
            diffs_received: entry.diffs_received,
            diffs_sent: entry.diffs_sent,
        }
    }
}
