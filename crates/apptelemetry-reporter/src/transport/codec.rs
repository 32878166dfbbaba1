//! Decode-once codec for the reporter transport.
//!
//! - Binary and Text frames => request bytes (first byte is the command)
//! - Ping/Pong/Close are surfaced for lifecycle management

use bytes::Bytes;
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug)]
pub enum Inbound {
    Request(Bytes),
    Ping(Vec<u8>),
    Pong,
    Close,
    /// Raw frames only appear when writing; nothing to do on read.
    Ignored,
}

pub fn decode(msg: Message) -> Inbound {
    match msg {
        Message::Binary(b) => Inbound::Request(Bytes::from(b)),
        Message::Text(s) => Inbound::Request(Bytes::from(s.into_bytes())),
        Message::Ping(v) => Inbound::Ping(v),
        Message::Pong(_) => Inbound::Pong,
        Message::Close(_) => Inbound::Close,
        Message::Frame(_) => Inbound::Ignored,
    }
}
