//! Server configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Every value has a default, so a bare
//! `cargo run` serves the fixed development endpoint `127.0.0.1:8000`.

use std::net::SocketAddr;

/// Top-level server configuration.
///
/// Loaded once at startup via [`SyncConfig::from_env`].
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Socket address to bind the server to (`LISTEN_ADDR`).
    pub listen_addr: SocketAddr,

    /// Capacity of the EventBus broadcast channel (`EVENT_BUS_CAPACITY`).
    pub event_bus_capacity: usize,

    /// Per-peer outbound queue length (`OUTBOUND_QUEUE_CAPACITY`). A peer
    /// that falls this many envelopes behind stops receiving pushes until
    /// it drains.
    pub outbound_queue_capacity: usize,
}

impl SyncConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set. Calls
    /// `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8000".to_string())
            .parse()?;

        let event_bus_capacity = parse_env("EVENT_BUS_CAPACITY", 1024);
        let outbound_queue_capacity = parse_env("OUTBOUND_QUEUE_CAPACITY", 64);

        Ok(Self {
            listen_addr,
            event_bus_capacity,
            outbound_queue_capacity,
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
