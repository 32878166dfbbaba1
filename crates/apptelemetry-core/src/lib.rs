//! apptelemetry core: metric addressing, the aggregation store, the exposition
//! renderer and the one-byte request/response protocol.
//!
//! This crate carries no transport or runtime dependencies. The reporter binds
//! it to a WebSocket connection, tests drive it directly.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed dimension keys are rejected when the key is built, so the
//! recording and export paths are total.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod histogram;
pub mod key;
pub mod protocol;
pub mod render;
pub mod store;

pub use error::{Result, TelemetryError};
pub use key::{Category, DimensionKey, HistogramFamily, KvOperation, Outcome};
pub use store::{FixedKvPolicy, KvLatencyPolicy, RandomKvPolicy, Snapshot, TelemetryStore};

/// Agent identifier attached as a label to every exported series.
///
/// Stable for the lifetime of the process.
pub fn default_agent() -> String {
    format!(
        "apptelemetry-rs/{} ({}/{})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
