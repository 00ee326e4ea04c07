//! Domain events emitted as peers come and go and state moves.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::peer_id::PeerId;

/// Why an inbound envelope was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The envelope's time was not newer than the peer's mirror.
    Stale,
    /// The frame was not a well-formed envelope.
    Malformed,
    /// The diff addressed paths the mirror does not have.
    ApplyFailed,
}

/// Event emitted on the bus after every peer or state transition.
///
/// Serialized with an `event_type` tag so bus consumers can route on a
/// single field.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum SyncEvent {
    /// A peer connected and was given a mirror.
    PeerConnected {
        /// The peer that connected.
        peer_id: PeerId,
        /// When the connection was registered.
        timestamp: DateTime<Utc>,
    },
    /// A peer disconnected and its mirror was dropped.
    PeerDisconnected {
        /// The peer that disconnected.
        peer_id: PeerId,
        /// When the teardown happened.
        timestamp: DateTime<Utc>,
    },
    /// An inbound envelope was applied and promoted to the shared state.
    DiffApplied {
        /// The peer whose envelope was applied.
        peer_id: PeerId,
        /// Version stamp the envelope carried.
        time: u64,
        /// When the envelope was applied.
        timestamp: DateTime<Utc>,
    },
    /// An inbound envelope was discarded.
    DiffRejected {
        /// The peer whose envelope was discarded.
        peer_id: PeerId,
        /// Why the envelope was discarded.
        reason: RejectReason,
        /// When the envelope was discarded.
        timestamp: DateTime<Utc>,
    },
    /// A catch-up diff was queued for a stale peer.
    StatePushed {
        /// The peer the diff was queued for.
        peer_id: PeerId,
        /// Version stamp the peer was brought up to.
        time: u64,
        /// When the push was queued.
        timestamp: DateTime<Utc>,
    },
}

impl SyncEvent {
    /// The peer the event concerns.
    #[must_use]
    pub const fn peer_id(&self) -> PeerId {
        match self {
            Self::PeerConnected { peer_id, .. }
            | Self::PeerDisconnected { peer_id, .. }
            | Self::DiffApplied { peer_id, .. }
            | Self::DiffRejected { peer_id, .. }
            | Self::StatePushed { peer_id, .. } => *peer_id,
        }
    }

    /// The serialized `event_type` tag, for logging and filtering.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::PeerConnected { .. } => "peer_connected",
            Self::PeerDisconnected { .. } => "peer_disconnected",
            Self::DiffApplied { .. } => "diff_applied",
            Self::DiffRejected { .. } => "diff_rejected",
            Self::StatePushed { .. } => "state_pushed",
        }
    }
}
