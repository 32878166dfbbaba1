use serde::Deserialize;
use apptelemetry_core::error::{Result, TelemetryError};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReporterConfig {
    pub version: u32,

    #[serde(default)]
    pub reporter: ReporterSection,

    #[serde(default)]
    pub workload: WorkloadSection,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            version: 1,
            reporter: ReporterSection::default(),
            workload: WorkloadSection::default(),
        }
    }
}

impl ReporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(TelemetryError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.reporter.validate()?;
        self.workload.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReporterSection {
    #[serde(default = "default_url")]
    pub url: String,

    /// Overrides the built-in agent identifier.
    #[serde(default)]
    pub agent: Option<String>,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

impl Default for ReporterSection {
    fn default() -> Self {
        Self {
            url: default_url(),
            agent: None,
            ping_interval_ms: default_ping_interval_ms(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

impl ReporterSection {
    pub fn validate(&self) -> Result<()> {
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(TelemetryError::Config(
                "reporter.url must start with ws:// or wss://".into(),
            ));
        }
        if matches!(self.agent.as_deref(), Some("")) {
            return Err(TelemetryError::Config("reporter.agent must not be empty".into()));
        }
        if !(1000..=120000).contains(&self.ping_interval_ms) {
            return Err(TelemetryError::Config(
                "reporter.ping_interval_ms must be between 1000 and 120000".into(),
            ));
        }
        if !(100..=600000).contains(&self.reconnect_delay_ms) {
            return Err(TelemetryError::Config(
                "reporter.reconnect_delay_ms must be between 100 and 600000".into(),
            ));
        }
        Ok(())
    }
}

fn default_url() -> String {
    "ws://localhost:8091/_appTelemetry".into()
}
fn default_ping_interval_ms() -> u64 {
    20000
}
fn default_reconnect_delay_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkloadSection {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default = "default_buckets")]
    pub buckets: Vec<String>,

    #[serde(default = "default_hosts")]
    pub hosts: Vec<String>,
}

impl Default for WorkloadSection {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_ms: default_interval_ms(),
            buckets: default_buckets(),
            hosts: default_hosts(),
        }
    }
}

impl WorkloadSection {
    pub fn validate(&self) -> Result<()> {
        if self.interval_ms > 60000 {
            return Err(TelemetryError::Config(
                "workload.interval_ms must be at most 60000".into(),
            ));
        }
        if self.buckets.is_empty() || self.buckets.iter().any(String::is_empty) {
            return Err(TelemetryError::Config(
                "workload.buckets must be non-empty and contain no empty names".into(),
            ));
        }
        if self.hosts.is_empty() || self.hosts.iter().any(String::is_empty) {
            return Err(TelemetryError::Config(
                "workload.hosts must be non-empty and contain no empty names".into(),
            ));
        }
        Ok(())
    }
}

fn default_enabled() -> bool {
    true
}
fn default_interval_ms() -> u64 {
    1
}
fn default_buckets() -> Vec<String> {
    ["default", "foo", "bar", "travel-sample"].map(String::from).to_vec()
}
fn default_hosts() -> Vec<String> {
    ["example.com", "example.org", "example.net"].map(String::from).to_vec()
}
