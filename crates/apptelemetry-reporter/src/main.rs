//! apptelemetry reporter
//!
//! - Connects to the collector WebSocket and answers GET_TELEMETRY requests
//! - Feeds the store with a synthetic workload when enabled
//! - Reconnects after `reconnect_delay_ms` when the connection ends

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use apptelemetry_core::TelemetryStore;
use apptelemetry_reporter::{app_state::ReporterState, config, transport, workload::Workload};

const CONFIG_PATH: &str = "apptelemetry-reporter.yaml";

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "reporter failed");
        std::process::exit(1);
    }
}

async fn run() -> apptelemetry_core::Result<()> {
    let cfg = config::load_or_default(CONFIG_PATH)?;
    let store = Arc::new(TelemetryStore::new());
    let state = ReporterState::new(cfg, Arc::clone(&store));
    tracing::info!(agent = state.agent(), url = %state.cfg().reporter.url, "apptelemetry-reporter starting");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let workload = if state.cfg().workload.enabled {
        let w = Workload::from_config(&state.cfg().workload)?;
        Some(tokio::spawn(w.run(Arc::clone(&store), shutdown_rx)))
    } else {
        None
    };

    let reconnect_delay = Duration::from_millis(state.cfg().reporter.reconnect_delay_ms);
    tokio::select! {
        _ = serve_forever(state.clone(), reconnect_delay) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown requested");
        }
    }

    let _ = shutdown_tx.send(true);
    if let Some(task) = workload {
        let _ = task.await;
    }
    Ok(())
}

async fn serve_forever(state: ReporterState, reconnect_delay: Duration) {
    let url = state.cfg().reporter.url.clone();
    loop {
        match transport::connect(&url).await {
            Ok(socket) => {
                if let Err(e) = transport::session::run_session(socket, state.clone()).await {
                    tracing::warn!(error = %e, "session failed");
                }
            }
            Err(e) => tracing::warn!(error = %e, "connect failed"),
        }
        tokio::time::sleep(reconnect_delay).await;
    }
}
