use std::net::SocketAddr;

use serde::Deserialize;
use apptelemetry_core::error::{Result, TelemetryError};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectorConfig {
    pub version: u32,

    #[serde(default)]
    pub collector: CollectorSection,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            version: 1,
            collector: CollectorSection::default(),
        }
    }
}

impl CollectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(TelemetryError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.collector.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectorSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,
}

impl Default for CollectorSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            poll_interval_ms: default_poll_interval_ms(),
            response_timeout_ms: default_response_timeout_ms(),
        }
    }
}

impl CollectorSection {
    pub fn validate(&self) -> Result<()> {
        if self.listen.parse::<SocketAddr>().is_err() {
            return Err(TelemetryError::Config(
                "collector.listen must be a valid SocketAddr".into(),
            ));
        }
        if !(10..=60000).contains(&self.poll_interval_ms) {
            return Err(TelemetryError::Config(
                "collector.poll_interval_ms must be between 10 and 60000".into(),
            ));
        }
        if !(10..=60000).contains(&self.response_timeout_ms) {
            return Err(TelemetryError::Config(
                "collector.response_timeout_ms must be between 10 and 60000".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| TelemetryError::Config(format!("collector.listen: {e}")))
    }
}

fn default_listen() -> String {
    "0.0.0.0:8091".into()
}
fn default_poll_interval_ms() -> u64 {
    1000
}
fn default_response_timeout_ms() -> u64 {
    1000
}
