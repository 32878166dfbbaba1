//! Shared reporter state: config, the aggregation store and the agent label.

use std::sync::Arc;

use apptelemetry_core::{default_agent, TelemetryStore};

use crate::config::ReporterConfig;

#[derive(Clone)]
pub struct ReporterState {
    inner: Arc<ReporterStateInner>,
    store: Arc<TelemetryStore>,
}

struct ReporterStateInner {
    cfg: ReporterConfig,
    agent: String,
}

impl ReporterState {
    pub fn new(cfg: ReporterConfig, store: Arc<TelemetryStore>) -> Self {
        let agent = cfg.reporter.agent.clone().unwrap_or_else(default_agent);
        Self {
            inner: Arc::new(ReporterStateInner { cfg, agent }),
            store,
        }
    }

    pub fn cfg(&self) -> &ReporterConfig {
        &self.inner.cfg
    }

    pub fn agent(&self) -> &str {
        &self.inner.agent
    }

    pub fn store(&self) -> Arc<TelemetryStore> {
        Arc::clone(&self.store)
    }
}
