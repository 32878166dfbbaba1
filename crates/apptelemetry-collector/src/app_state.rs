//! Shared application state for the collector.

use std::sync::Arc;

use crate::buffer::TelemetryBuffer;
use crate::config::CollectorConfig;

#[derive(Clone)]
pub struct CollectorState {
    inner: Arc<CollectorStateInner>,
}

struct CollectorStateInner {
    cfg: CollectorConfig,
    buffer: TelemetryBuffer,
}

impl CollectorState {
    pub fn new(cfg: CollectorConfig) -> Self {
        Self {
            inner: Arc::new(CollectorStateInner {
                cfg,
                buffer: TelemetryBuffer::new(),
            }),
        }
    }

    pub fn cfg(&self) -> &CollectorConfig {
        &self.inner.cfg
    }

    pub fn buffer(&self) -> &TelemetryBuffer {
        &self.inner.buffer
    }
}
