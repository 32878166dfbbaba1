//! Aggregation store.
//!
//! Counters and histograms live in a [`Window`] of `DashMap`s, created lazily
//! per key on first touch. Recording takes a shared lock on the current window
//! and updates atomics, so writers never wait on each other. `export` takes the
//! exclusive lock only long enough to swap in a fresh window; the captured one
//! is private afterwards and is converted and rendered without any lock held.
//!
//! Because every write happens under the shared lock, a sample lands either in
//! the window that `export` captures or in the fresh one, never in both and
//! never in a window that has already been handed off.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use parking_lot::RwLock;
use rand::Rng;

use crate::histogram::{AtomicHistogram, HistogramSnapshot};
use crate::key::{Category, DimensionKey, HistogramFamily, KvOperation, Outcome};

/// Picks the kv sub-operation a latency is attributed to.
///
/// The source of a kv latency does not say whether it was a retrieval or a
/// mutation, so the store delegates the choice. Any `Fn(&DimensionKey) ->
/// KvOperation` closure is a policy.
pub trait KvLatencyPolicy: Send + Sync {
    fn select(&self, key: &DimensionKey) -> KvOperation;
}

impl<F> KvLatencyPolicy for F
where
    F: Fn(&DimensionKey) -> KvOperation + Send + Sync,
{
    fn select(&self, key: &DimensionKey) -> KvOperation {
        self(key)
    }
}

/// Uniform random choice among the three kv sub-operations.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomKvPolicy;

impl KvLatencyPolicy for RandomKvPolicy {
    fn select(&self, _key: &DimensionKey) -> KvOperation {
        KvOperation::ALL[rand::rng().random_range(0..KvOperation::ALL.len())]
    }
}

/// Always attributes kv latencies to the same sub-operation.
#[derive(Debug, Clone, Copy)]
pub struct FixedKvPolicy(pub KvOperation);

impl KvLatencyPolicy for FixedKvPolicy {
    fn select(&self, _key: &DimensionKey) -> KvOperation {
        self.0
    }
}

#[derive(Default)]
struct Window {
    counters: DashMap<(DimensionKey, Outcome), AtomicU64>,
    histograms: DashMap<(DimensionKey, HistogramFamily), AtomicHistogram>,
}

/// Concurrent accumulator with atomic export-and-reset.
pub struct TelemetryStore {
    window: RwLock<Window>,
    kv_policy: Box<dyn KvLatencyPolicy>,
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryStore {
    /// Store with the random kv attribution policy.
    pub fn new() -> Self {
        Self::with_kv_policy(RandomKvPolicy)
    }

    pub fn with_kv_policy(policy: impl KvLatencyPolicy + 'static) -> Self {
        Self {
            window: RwLock::new(Window::default()),
            kv_policy: Box::new(policy),
        }
    }

    /// Increment the counter for `outcome` by 1.
    pub fn record_outcome(&self, key: &DimensionKey, outcome: Outcome) {
        let window = self.window.read();
        window
            .counters
            .entry((key.clone(), outcome))
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn total(&self, key: &DimensionKey) {
        self.record_outcome(key, Outcome::Total);
    }

    pub fn ambiguous_timeout(&self, key: &DimensionKey) {
        self.record_outcome(key, Outcome::AmbiguousTimeout);
    }

    pub fn unambiguous_timeout(&self, key: &DimensionKey) {
        self.record_outcome(key, Outcome::UnambiguousTimeout);
    }

    pub fn cancelled(&self, key: &DimensionKey) {
        self.record_outcome(key, Outcome::Cancelled);
    }

    /// Record a latency in seconds. Kv latencies go to the family chosen by the
    /// store's [`KvLatencyPolicy`].
    pub fn record_latency(&self, key: &DimensionKey, secs: f64) {
        let family = match HistogramFamily::for_service(key.category()) {
            Some(family) => family,
            None => HistogramFamily::Kv(self.kv_policy.select(key)),
        };
        self.observe(key, family, secs);
    }

    /// Record a kv latency whose sub-operation is known to the caller.
    ///
    /// On a non-kv key the sub-operation is meaningless and the latency is
    /// recorded as [`TelemetryStore::record_latency`] would.
    pub fn record_kv_latency(&self, key: &DimensionKey, op: KvOperation, secs: f64) {
        if key.category() != Category::Kv {
            tracing::warn!(category = %key.category(), "kv sub-operation given for non-kv key");
            self.record_latency(key, secs);
            return;
        }
        self.observe(key, HistogramFamily::Kv(op), secs);
    }

    fn observe(&self, key: &DimensionKey, family: HistogramFamily, secs: f64) {
        // NaN compares false against every bound, including +Inf.
        if secs.is_nan() {
            tracing::warn!(metric = family.metric_name(), "dropping NaN latency");
            return;
        }
        let window = self.window.read();
        window
            .histograms
            .entry((key.clone(), family))
            .or_insert_with(|| AtomicHistogram::new(family.bounds()))
            .observe(secs);
    }

    /// Capture everything recorded so far and reset to an empty window.
    pub fn export(&self) -> Snapshot {
        let (captured, timestamp_ms) = {
            let mut window = self.window.write();
            (std::mem::take(&mut *window), now_millis())
        };
        let snapshot = Snapshot::from_window(timestamp_ms, captured);
        tracing::trace!(
            counters = snapshot.counters.len(),
            histograms = snapshot.histograms.len(),
            "telemetry window exported"
        );
        snapshot
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// One export window: counters and histograms plus the capture time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    /// Milliseconds since the Unix epoch at capture.
    pub timestamp_ms: u64,
    pub counters: BTreeMap<(DimensionKey, Outcome), u64>,
    pub histograms: BTreeMap<(DimensionKey, HistogramFamily), HistogramSnapshot>,
}

impl Snapshot {
    fn from_window(timestamp_ms: u64, window: Window) -> Self {
        Self {
            timestamp_ms,
            counters: window
                .counters
                .into_iter()
                .map(|(k, v)| (k, v.into_inner()))
                .collect(),
            histograms: window
                .histograms
                .into_iter()
                .map(|(k, v)| (k, v.into_snapshot()))
                .collect(),
        }
    }

    /// Counter value, zero when never incremented in this window.
    pub fn counter(&self, key: &DimensionKey, outcome: Outcome) -> u64 {
        self.counters
            .get(&(key.clone(), outcome))
            .copied()
            .unwrap_or(0)
    }

    pub fn histogram(&self, key: &DimensionKey, family: HistogramFamily) -> Option<&HistogramSnapshot> {
        self.histograms.get(&(key.clone(), family))
    }

    /// Sum of all counter values in the window.
    pub fn counter_total(&self) -> u64 {
        self.counters.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty() && self.histograms.is_empty()
    }
}
