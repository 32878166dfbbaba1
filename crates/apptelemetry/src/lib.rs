//! Top-level facade crate for apptelemetry.
//!
//! Re-exports the core engine, the reporter and the collector so users can
//! depend on a single crate.

pub mod core {
    pub use apptelemetry_core::*;
}

pub mod reporter {
    pub use apptelemetry_reporter::*;
}

pub mod collector {
    pub use apptelemetry_collector::*;
}
