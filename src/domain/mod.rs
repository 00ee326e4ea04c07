//! Domain layer: core types, peer registry, and event system.
//!
//! This module contains the server-side domain model: peer identity,
//! per-peer mirror entries, state snapshots and the wire envelope, the
//! event bus for broadcasting sync transitions, and the transport
//! abstraction catch-up diffs travel through.

pub mod event_bus;
pub mod peer_entry;
pub mod peer_id;
pub mod peer_registry;
pub mod state;
pub mod sync_event;
pub mod transport;

pub use event_bus::EventBus;
pub use peer_entry::{PeerEntry, PeerSummary};
pub use peer_id::PeerId;
pub use peer_registry::PeerRegistry;
pub use state::{StateDiff, StateSnapshot};
pub use sync_event::SyncEvent;
pub use transport::StateTransport;
