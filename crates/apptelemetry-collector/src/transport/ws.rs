//! Reporter polling over WebSocket.
//!
//! Per connection, every `poll_interval_ms`:
//! - send GET_TELEMETRY
//! - wait up to `response_timeout_ms` for one binary response
//! - SUCCESS => buffer the payload; UNKNOWN_COMMAND, non-binary or timeout => close
//!
//! Ping/Pong frames from the reporter are keepalives and never count as the
//! response.

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, State},
    response::Response,
};
use bytes::Bytes;
use tokio::time::{Duration, Instant};

use apptelemetry_core::protocol::wire::{decode_response, Command, Status};

use crate::app_state::CollectorState;

// --------------------
// Entry
// --------------------
pub async fn ws_upgrade(State(app): State<CollectorState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| poll_telemetry(app, socket))
}

/// Why a polling loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollEnd {
    PeerGone,
    Timeout,
    UnknownCommand,
    BadResponse,
}

// --------------------
// Core polling loop
// --------------------
async fn poll_telemetry(app: CollectorState, mut socket: WebSocket) {
    let cfg = &app.cfg().collector;
    let poll_every = Duration::from_millis(cfg.poll_interval_ms);
    let response_timeout = Duration::from_millis(cfg.response_timeout_ms);

    let mut poll_tick = tokio::time::interval_at(Instant::now() + poll_every, poll_every);
    poll_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    tracing::info!("reporter connected");

    let end = loop {
        poll_tick.tick().await;

        let request = Message::Binary(Command::GetTelemetry.encode().to_vec());
        if socket.send(request).await.is_err() {
            break PollEnd::PeerGone;
        }

        let msg = match tokio::time::timeout(response_timeout, next_response(&mut socket)).await {
            Err(_) => break PollEnd::Timeout,
            Ok(None) => break PollEnd::PeerGone,
            Ok(Some(msg)) => msg,
        };

        let Message::Binary(data) = msg else {
            tracing::warn!("expected binary response from reporter");
            break PollEnd::BadResponse;
        };

        match decode_response(Bytes::from(data)) {
            Ok((Status::Success, payload)) => match String::from_utf8(payload.to_vec()) {
                Ok(text) => app.buffer().add_message(text),
                Err(e) => {
                    tracing::warn!(error = %e, "telemetry payload is not utf-8");
                    break PollEnd::BadResponse;
                }
            },
            Ok((Status::UnknownCommand, _)) => {
                tracing::warn!("reporter does not understand GET_TELEMETRY");
                break PollEnd::UnknownCommand;
            }
            Err(e) => {
                tracing::warn!(error = %e, "malformed telemetry response");
                break PollEnd::BadResponse;
            }
        }
    };

    match end {
        PollEnd::Timeout => tracing::warn!(?response_timeout, "no telemetry response in time"),
        other => tracing::info!(reason = ?other, "reporter polling stopped"),
    }
    let _ = socket.close().await;
}

/// Next data frame, skipping keepalives. `None` once the peer is gone.
async fn next_response(socket: &mut WebSocket) -> Option<Message> {
    while let Some(msg) = socket.recv().await {
        match msg {
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(msg) => return Some(msg),
        }
    }
    None
}
