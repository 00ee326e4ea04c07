//! Transport abstraction: how catch-up diffs reach peers.

use std::fmt;

use super::peer_id::PeerId;
use super::state::StateDiff;
use crate::error::SyncError;

/// A delivery medium the sync service can push envelopes through.
///
/// Implementations enumerate the peers currently reachable and queue an
/// envelope to one peer without blocking; [`crate::ws::WsTransport`] is
/// the in-tree implementation. Inbound envelopes do not pass through this
/// trait; connection handlers feed them straight to the service.
pub trait StateTransport: fmt::Debug + Send + Sync {
    /// Peers currently reachable through this transport.
    fn peers(&self) -> Vec<PeerId>;

    /// Queues an envelope for delivery to one peer.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::PeerUnreachable`] when the peer has no live
    /// connection here and [`SyncError::QueueFull`] when its outbound
    /// queue has no room. Either way the caller leaves the peer's mirror
    /// untouched and retries on a later sync.
    fn send_diff(&self, peer_id: PeerId, envelope: &StateDiff) -> Result<(), SyncError>;
}
