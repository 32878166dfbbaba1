//! Command and status codes (panic-free parsing).
//!
//! Parsing rules:
//! - Never index (`buf[0]`) — always use `Buf` and `remaining()` checks.
//! - Never `unwrap()` / `expect()` / `panic!()` in production paths.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, TelemetryError};

/// Request command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    GetTelemetry,
}

impl Command {
    pub fn code(self) -> u8 {
        match self {
            Command::GetTelemetry => 0,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Command::GetTelemetry),
            _ => None,
        }
    }

    /// Encode as a request frame.
    pub fn encode(self) -> Bytes {
        Bytes::copy_from_slice(&[self.code()])
    }
}

/// Response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    UnknownCommand,
}

impl Status {
    pub fn code(self) -> u8 {
        match self {
            Status::Success => 0,
            Status::UnknownCommand => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Status::Success),
            1 => Some(Status::UnknownCommand),
            _ => None,
        }
    }
}

/// Decode a request frame. Bytes after the command byte are ignored.
pub fn decode_command(mut buf: Bytes) -> Result<Command> {
    if !buf.has_remaining() {
        return Err(TelemetryError::EmptyFrame);
    }
    let code = buf.get_u8();
    Command::from_code(code).ok_or(TelemetryError::UnknownCommand(code))
}

/// Encode a response frame: status byte, then `payload` verbatim.
pub fn encode_response(status: Status, payload: &[u8]) -> Bytes {
    let mut out = BytesMut::with_capacity(1 + payload.len());
    out.put_u8(status.code());
    out.put_slice(payload);
    out.freeze()
}

/// Decode a response frame into its status and (possibly empty) payload.
pub fn decode_response(mut buf: Bytes) -> Result<(Status, Bytes)> {
    if !buf.has_remaining() {
        return Err(TelemetryError::EmptyFrame);
    }
    let code = buf.get_u8();
    let status = Status::from_code(code).ok_or(TelemetryError::UnknownStatus(code))?;
    Ok((status, buf))
}
