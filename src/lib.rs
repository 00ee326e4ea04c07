//! # statesync
//!
//! WebSocket state-synchronization server driven by structural JSON diffs.
//!
//! Peers connect over a WebSocket and exchange one frame shape, the diff
//! envelope `{"diff": ..., "time": ...}`. The server holds the
//! authoritative document, applies whatever arrives (the newest envelope
//! wins), and pushes each stale peer the minimal diff that brings its
//! mirror current. All diff mathematics live in [`diff`] — the rest of
//! the crate is a coordination layer.
//!
//! ## Architecture
//!
//! ```text
//! Peers (WebSocket /)        Operators (REST /health, /api/v1)
//!     │                          │
//!     ├── WS Handler (ws/)       ├── REST Handlers (api/)
//!     │
//!     ├── SyncService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── PeerRegistry (domain/)
//!     ├── WsTransport (ws/)
//!     │
//!     └── diff engine (diff/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod diff;
pub mod domain;
pub mod error;
pub mod service;
pub mod ws;
