//! Axum router wiring (HTTP -> WS upgrade, scrape endpoint).

use axum::{routing::get, Router};

use crate::{app_state::CollectorState, ops, transport};

pub fn build_router(state: CollectorState) -> Router {
    Router::new()
        .route("/_appTelemetry", get(transport::ws::ws_upgrade))
        .route("/metrics", get(ops::metrics))
        .route("/healthz", get(ops::healthz))
        .with_state(state)
}
