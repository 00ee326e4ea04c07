//! Manual WebSocket probe.
//!
//! Ad-hoc harness for poking a running statesync server by hand: connects
//! to the fixed development endpoint, logs the handshake and every frame
//! the server sends, and then parks forever so the process can be watched
//! and killed from the terminal. Compression is never negotiated on the
//! socket.
//!
//! This is deliberately not a client library: no reconnects, no retries,
//! no configuration.

use anyhow::Result;
use futures_util::StreamExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing_subscriber::EnvFilter;

/// The server's fixed development endpoint.
const SERVER_URL: &str = "ws://127.0.0.1:8000";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    probe(SERVER_URL).await;

    // Keep the process alive after the socket is gone, mirroring a
    // harness left running in a terminal.
    std::future::pending::<()>().await;
    Ok(())
}

/// Connects and logs everything the server sends. Errors end the probe
/// but never abort the process.
async fn probe(url: &str) {
    let (mut ws, _response) = match connect_async(url).await {
        Ok(pair) => pair,
        Err(err) => {
            tracing::error!(url, error = %err, "connect failed");
            return;
        }
    };
    tracing::info!(url, "ws opened");

    // Scripted edit stream, enable to feed the server from this side:
    //
    // use futures_util::SinkExt;
    // use statesync::domain::state::{StateDiff, now_millis};
    //
    // let hello = StateDiff::new(serde_json::json!([]), now_millis());
    // ws.send(Message::text(serde_json::to_string(&hello)?)).await?;
    //
    // let mut ticker = tokio::time::interval(std::time::Duration::from_secs(4));
    // loop {
    //     ticker.tick().await;
    //     let bump = StateDiff::new(serde_json::json!({"_t": "A", "0:0": [1]}), now_millis());
    //     ws.send(Message::text(serde_json::to_string(&bump)?)).await?;
    // }

    while let Some(frame) = ws.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                tracing::info!(frame = %text.as_str(), "received");
            }
            Ok(Message::Close(frame)) => {
                tracing::info!(?frame, "server closed the connection");
                break;
            }
            Ok(_) => {}
            Err(err) => {
                tracing::error!(error = %err, "ws read failed");
                break;
            }
        }
    }
}
