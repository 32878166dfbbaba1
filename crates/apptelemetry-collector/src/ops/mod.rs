//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `/metrics` : buffered telemetry in exposition text format

use axum::{extract::State, http::StatusCode, response::{IntoResponse, Response}};

use crate::app_state::CollectorState;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn metrics(State(state): State<CollectorState>) -> Response {
    let body = state.buffer().drain();

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}
