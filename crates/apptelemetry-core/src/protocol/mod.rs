//! One-byte request/response protocol.
//!
//! - Request: a single command byte (`0` = GET_TELEMETRY).
//! - Response: a status byte (`0` = SUCCESS, `1` = UNKNOWN_COMMAND) followed,
//!   on success only, by the rendered exposition text.
//!
//! Parsers are panic-free: malformed input becomes a `TelemetryError`, which
//! the request layer turns into a status byte instead of a fault.

pub mod request;
pub mod wire;
