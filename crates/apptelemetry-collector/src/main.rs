//! apptelemetry collector
//!
//! - WebSocket endpoint for reporters: /_appTelemetry
//! - Polls each reporter for telemetry and buffers the text
//! - Scrape endpoint: /metrics

use tracing_subscriber::{fmt, EnvFilter};

use apptelemetry_collector::{app_state::CollectorState, config, router};
use apptelemetry_core::error::TelemetryError;

const CONFIG_PATH: &str = "apptelemetry-collector.yaml";

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "collector failed");
        std::process::exit(1);
    }
}

async fn run() -> apptelemetry_core::Result<()> {
    let cfg = config::load_or_default(CONFIG_PATH)?;
    let listen = cfg.collector.listen_addr()?;

    let state = CollectorState::new(cfg);
    let app = router::build_router(state);

    tracing::info!(%listen, "apptelemetry-collector starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| TelemetryError::Transport(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| TelemetryError::Internal(format!("server failed: {e}")))
}
