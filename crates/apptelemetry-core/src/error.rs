//! Shared error type across apptelemetry crates.

use thiserror::Error;

use crate::protocol::wire::Status;

/// Shared result type.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Unified error type used by core, reporter and collector.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid dimension key: {0}")]
    InvalidKey(String),
    #[error("unknown operation category: {0}")]
    UnknownCategory(String),
    #[error("empty frame")]
    EmptyFrame,
    #[error("unknown command: {0}")]
    UnknownCommand(u8),
    #[error("unknown status: {0}")]
    UnknownStatus(u8),
    #[error("config: {0}")]
    Config(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl TelemetryError {
    /// Map an error to the status byte reported to the remote peer.
    ///
    /// The protocol defines a single failure code, so every error maps to it.
    pub fn status(&self) -> Status {
        Status::UnknownCommand
    }
}
