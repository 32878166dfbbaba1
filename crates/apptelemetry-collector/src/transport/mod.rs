//! Transport layer (WebSocket).
//!
//! Exposes the WS upgrade handler that polls a connected reporter.

pub mod ws;
