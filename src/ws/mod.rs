//! WebSocket layer: connection handling and outbound delivery.
//!
//! The WebSocket endpoint at the router root (`/`) is the sync wire.
//! Every frame in either direction is a diff envelope
//! (see [`crate::domain::StateDiff`]).

pub mod connection;
pub mod handler;
pub mod transport;

pub use transport::WsTransport;
