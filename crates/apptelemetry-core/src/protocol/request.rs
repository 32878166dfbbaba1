//! Request handling: one command frame in, one response frame out.

use bytes::Bytes;

use crate::protocol::wire::{decode_command, encode_response, Command, Status};
use crate::render::render;
use crate::store::TelemetryStore;

/// Answer one request frame.
///
/// `GET_TELEMETRY` exports the store (resetting it) and returns `SUCCESS`
/// followed by the rendered text. Empty or unknown frames return a lone
/// `UNKNOWN_COMMAND` byte and leave the store untouched. The response is fully
/// built in memory before it is returned.
pub fn handle_request(store: &TelemetryStore, agent: &str, frame: Bytes) -> Bytes {
    match decode_command(frame) {
        Ok(Command::GetTelemetry) => {
            let snapshot = store.export();
            let body = render(&snapshot, agent);
            tracing::debug!(bytes = body.len(), "telemetry exported");
            encode_response(Status::Success, body.as_bytes())
        }
        Err(e) => {
            tracing::debug!(error = %e, "rejecting telemetry request");
            encode_response(e.status(), &[])
        }
    }
}
