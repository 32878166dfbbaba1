//! Synthetic workload.
//!
//! Invents service calls against a fixed set of buckets and hosts and records
//! their outcomes in the store, so the reporter has something to export when
//! no real client is attached.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;

use apptelemetry_core::error::Result;
use apptelemetry_core::{Category, DimensionKey, TelemetryStore};

use crate::config::WorkloadSection;

/// Outcome of one synthetic request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Success,
    Error,
    AmbiguousTimeout,
    UnambiguousTimeout,
    Cancelled,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 5] = [
        RequestStatus::Success,
        RequestStatus::Error,
        RequestStatus::AmbiguousTimeout,
        RequestStatus::UnambiguousTimeout,
        RequestStatus::Cancelled,
    ];
}

/// Record one finished request: always `total`, plus the outcome counter or,
/// on success, the latency.
pub fn record(store: &TelemetryStore, key: &DimensionKey, status: RequestStatus, latency_secs: f64) {
    store.total(key);
    match status {
        RequestStatus::Success => store.record_latency(key, latency_secs),
        RequestStatus::AmbiguousTimeout => store.ambiguous_timeout(key),
        RequestStatus::UnambiguousTimeout => store.unambiguous_timeout(key),
        RequestStatus::Cancelled => store.cancelled(key),
        RequestStatus::Error => {}
    }
}

pub struct Workload {
    keys: Vec<DimensionKey>,
    interval: Duration,
}

impl Workload {
    /// Every category crossed with the configured buckets and hosts.
    pub fn from_config(cfg: &WorkloadSection) -> Result<Self> {
        let mut keys = Vec::with_capacity(Category::ALL.len() * cfg.buckets.len() * cfg.hosts.len());
        for category in Category::ALL {
            for bucket in &cfg.buckets {
                for host in &cfg.hosts {
                    keys.push(DimensionKey::new(category, bucket.as_str(), host.as_str())?);
                }
            }
        }
        Ok(Self {
            keys,
            interval: Duration::from_millis(cfg.interval_ms),
        })
    }

    pub fn keys(&self) -> &[DimensionKey] {
        &self.keys
    }

    /// Record one random request.
    pub fn step<R: Rng>(&self, store: &TelemetryStore, rng: &mut R) {
        if self.keys.is_empty() {
            return;
        }
        let key = &self.keys[rng.random_range(0..self.keys.len())];
        let status = RequestStatus::ALL[rng.random_range(0..RequestStatus::ALL.len())];
        let latency = rng.random_range(0.01..=3.0);
        record(store, key, status, latency);
    }

    /// Generate requests until `shutdown` flips to true or its sender is dropped.
    pub async fn run(self, store: Arc<TelemetryStore>, mut shutdown: watch::Receiver<bool>) {
        let mut rng = StdRng::from_os_rng();
        tracing::info!(keys = self.keys.len(), interval = ?self.interval, "workload started");

        loop {
            if *shutdown.borrow() {
                break;
            }
            self.step(&store, &mut rng);

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = pace(self.interval) => {}
            }
        }

        tracing::info!("workload stopped");
    }
}

async fn pace(interval: Duration) {
    if interval.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apptelemetry_core::{HistogramFamily, Outcome};

    fn key() -> DimensionKey {
        DimensionKey::new(Category::Search, "default", "example.com").unwrap()
    }

    #[test]
    fn success_records_latency_not_outcome() {
        let store = TelemetryStore::new();
        record(&store, &key(), RequestStatus::Success, 0.5);

        let snap = store.export();
        assert_eq!(snap.counter(&key(), Outcome::Total), 1);
        assert_eq!(snap.counters.len(), 1);
        assert_eq!(snap.histogram(&key(), HistogramFamily::Search).map(|h| h.count()), Some(1));
    }

    #[test]
    fn error_records_only_total() {
        let store = TelemetryStore::new();
        record(&store, &key(), RequestStatus::Error, 0.5);

        let snap = store.export();
        assert_eq!(snap.counter_total(), 1);
        assert!(snap.histograms.is_empty());
    }

    #[test]
    fn timeouts_and_cancellations_hit_their_counters() {
        let store = TelemetryStore::new();
        record(&store, &key(), RequestStatus::AmbiguousTimeout, 0.0);
        record(&store, &key(), RequestStatus::UnambiguousTimeout, 0.0);
        record(&store, &key(), RequestStatus::Cancelled, 0.0);

        let snap = store.export();
        assert_eq!(snap.counter(&key(), Outcome::Total), 3);
        assert_eq!(snap.counter(&key(), Outcome::AmbiguousTimeout), 1);
        assert_eq!(snap.counter(&key(), Outcome::UnambiguousTimeout), 1);
        assert_eq!(snap.counter(&key(), Outcome::Cancelled), 1);
    }

    #[test]
    fn steps_stay_within_configured_keys() {
        let cfg = WorkloadSection::default();
        let workload = Workload::from_config(&cfg).unwrap();
        assert_eq!(workload.keys().len(), 4 * 4 * 3);

        let store = TelemetryStore::new();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            workload.step(&store, &mut rng);
        }

        let snap = store.export();
        let totals: u64 = snap
            .counters
            .iter()
            .filter(|((_, o), _)| *o == Outcome::Total)
            .map(|(_, v)| *v)
            .sum();
        assert_eq!(totals, 500);
        for ((key, _), _) in &snap.counters {
            assert!(workload.keys().contains(key));
        }
        for h in snap.histograms.values() {
            assert!(h.sum() >= 0.009 * h.count() as f64);
        }
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let cfg = WorkloadSection::default();
        let workload = Workload::from_config(&cfg).unwrap();
        let store = Arc::new(TelemetryStore::new());
        let (tx, rx) = watch::channel(false);

        let task = tokio::spawn(workload.run(Arc::clone(&store), rx));
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("workload must stop")
            .unwrap();

        assert!(store.export().counter_total() > 0);
    }
}
