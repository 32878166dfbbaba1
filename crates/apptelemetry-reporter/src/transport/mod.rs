//! Transport layer (client WebSocket).
//!
//! Exposes the connect helper, the codec that classifies inbound frames once,
//! and the session loop that answers telemetry requests.

pub mod codec;
pub mod session;

use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use apptelemetry_core::error::{Result, TelemetryError};

pub type ClientSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Open a client connection to the collector.
pub async fn connect(url: &str) -> Result<ClientSocket> {
    let (socket, _resp) = tokio_tungstenite::connect_async(url)
        .await
        .map_err(|e| TelemetryError::Transport(format!("connect {url} failed: {e}")))?;
    tracing::info!(%url, "connected to collector");
    Ok(socket)
}
