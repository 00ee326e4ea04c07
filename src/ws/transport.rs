//! WebSocket-backed [`StateTransport`]: per-peer outbound queues.

use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::mpsc;

use crate::domain::{PeerId, StateDiff, StateTransport};
use crate::error::SyncError;

/// Delivery over the live WebSocket connections.
///
/// Each connection registers a bounded mpsc queue under its [`PeerId`];
/// the connection task drains the queue onto the socket. Sends never
/// block: a full queue is reported as an error and the service treats the
/// peer as still stale.
#[derive(Debug)]
pub struct WsTransport {
    queue_capacity: usize,
    senders: RwLock<HashMap<PeerId, mpsc::Sender<StateDiff>>>,
}

impl WsTransport {
    /// Creates a transport whose peer queues hold `queue_capacity`
    /// envelopes.
    #[must_use]
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            queue_capacity: queue_capacity.max(1),
            senders: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a peer and hands back the receiving end of its queue.
    /// A previous queue under the same peer is dropped.
    #[must_use]
    pub fn register(&self, peer_id: PeerId) -> mpsc::Receiver<StateDiff> {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        if let Ok(mut senders) = self.senders.write() {
            senders.insert(peer_id, tx);
        }
        rx
    }

    /// Drops the peer's queue; subsequent sends report it unreachable.
    pub fn unregister(&self, peer_id: PeerId) {
        if let Ok(mut senders) = self.senders.write() {
            senders.remove(&peer_id);
        }
    }

    /// Number of registered peers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.senders.read().map_or(0, |senders| senders.len())
    }

    /// `true` when no peer is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StateTransport for WsTransport {
    fn peers(&self) -> Vec<PeerId> {
        self.senders
            .read()
            .map_or_else(|_| Vec::new(), |senders| senders.keys().copied().collect())
    }

    fn send_diff(&self, peer_id: PeerId, envelope: &StateDiff) -> Result<(), SyncError> {
        let sender = {
            let senders = self
                .senders
                .read()
                .map_err(|_| SyncError::Internal("ws sender map poisoned".to_string()))?;
            senders
                .get(&peer_id)
                .cloned()
                .ok_or(SyncError::PeerUnreachable { peer_id })?
        };
        sender.try_send(envelope.clone()).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => SyncError::QueueFull { peer_id },
            mpsc::error::TrySendError::Closed(_) => SyncError::PeerUnreachable { peer_id },
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn queued_envelope_reaches_the_receiver() {
        let transport = WsTransport::new(4);
        let peer_id = PeerId::new();
        let mut rx = transport.register(peer_id);

        let envelope = StateDiff::new(json!({"a": 1}), 1);
        assert!(transport.send_diff(peer_id, &envelope).is_ok());

        let received = rx.recv().await;
        assert_eq!(received, Some(envelope));
    }

    #[test]
    fn unknown_peer_is_unreachable() {
        let transport = WsTransport::new(4);
        let result = transport.send_diff(PeerId::new(), &StateDiff::new(json!(null), 1));
        assert!(matches!(result, Err(SyncError::PeerUnreachable { .. })));
    }

    #[test]
    fn full_queue_is_reported_not_blocked_on() {
        let transport = WsTransport::new(1);
        let peer_id = PeerId::new();
        let _rx = transport.register(peer_id);

        let envelope = StateDiff::new(json!(1), 1);
        assert!(transport.send_diff(peer_id, &envelope).is_ok());
        let result = transport.send_diff(peer_id, &envelope);
        assert!(matches!(result, Err(SyncError::QueueFull { .. })));
    }

    #[test]
    fn dropped_receiver_makes_the_peer_unreachable() {
        let transport = WsTransport::new(4);
        let peer_id = PeerId::new();
        drop(transport.register(peer_id));

        let result = transport.send_diff(peer_id, &StateDiff::new(json!(1), 1));
        assert!(matches!(result, Err(SyncError::PeerUnreachable { .. })));
    }

    #[test]
    fn unregister_removes_the_peer() {
        let transport = WsTransport::new(4);
        let peer_id = PeerId::new();
        let _rx = transport.register(peer_id);
        assert_eq!(transport.peers(), vec![peer_id]);
        assert_eq!(transport.len(), 1);

        transport.unregister(peer_id);
        assert!(transport.peers().is_empty());
        assert!(transport.is_empty());
    }
}
