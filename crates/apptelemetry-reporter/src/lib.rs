//! apptelemetry reporter library entry.
//!
//! Binds the core aggregation store to a client WebSocket connection: the
//! remote collector sends `GET_TELEMETRY`, the session loop answers with the
//! rendered window. Also hosts the synthetic workload that feeds the store in
//! the demo binary.

pub mod app_state;
pub mod config;
pub mod transport;
pub mod workload;
