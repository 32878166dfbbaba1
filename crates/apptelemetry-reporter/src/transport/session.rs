//! Reporter session loop.
//!
//! Per connection:
//! - Ping => Pong with the same payload, keep going
//! - Close => stop
//! - Data frame => one binary response built by `handle_request`
//! - Keepalive pings every `ping_interval_ms`
//!
//! The response is rendered fully before it is written. If the peer has gone
//! away by then the response is dropped; that is not an error.

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::time::{Duration, Instant};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use apptelemetry_core::error::{Result, TelemetryError};
use apptelemetry_core::protocol::request::handle_request;

use crate::app_state::ReporterState;
use crate::transport::codec::{decode, Inbound};

/// Serve telemetry requests on `socket` until the peer closes it.
///
/// Returns `Ok` when the connection ends by close frame or end of stream, and
/// `Err(Transport)` when reading from it fails.
pub async fn run_session<S>(socket: S, state: ReporterState) -> Result<()>
where
    S: Stream<Item = std::result::Result<Message, WsError>>
        + Sink<Message, Error = WsError>
        + Unpin,
{
    let (mut ws_tx, mut ws_rx) = socket.split();

    let ping_every = Duration::from_millis(state.cfg().reporter.ping_interval_ms);
    let mut ping_tick = tokio::time::interval_at(Instant::now() + ping_every, ping_every);
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            incoming = ws_rx.next() => {
                let Some(incoming) = incoming else {
                    tracing::info!("connection ended");
                    break;
                };
                let msg = incoming
                    .map_err(|e| TelemetryError::Transport(format!("read failed: {e}")))?;

                match decode(msg) {
                    Inbound::Request(frame) => {
                        let resp = handle_request(&state.store(), state.agent(), frame);
                        if ws_tx.send(Message::Binary(resp.to_vec())).await.is_err() {
                            tracing::debug!("peer gone, dropping telemetry response");
                            break;
                        }
                    }
                    Inbound::Ping(payload) => {
                        if ws_tx.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Inbound::Pong | Inbound::Ignored => {}
                    Inbound::Close => {
                        tracing::info!("server closed connection");
                        break;
                    }
                }
            }

            _ = ping_tick.tick() => {
                if ws_tx.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    Ok(())
}
