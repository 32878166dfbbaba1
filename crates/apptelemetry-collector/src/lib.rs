//! apptelemetry collector library entry.
//!
//! Accepts reporter connections, polls them for telemetry, buffers the
//! returned text and serves it to a pull scraper on `/metrics`. Consumed by
//! the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod buffer;
pub mod config;
pub mod ops;
pub mod router;
pub mod transport;
