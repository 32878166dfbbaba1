//! Lock-free cumulative histogram.
//!
//! Buckets count every observation less than or equal to their bound, so the
//! final `+Inf` bucket always equals `count`. The sum is kept as `f64` bits in
//! an `AtomicU64` and updated with a CAS loop.

use std::sync::atomic::{AtomicU64, Ordering};

pub(crate) struct AtomicHistogram {
    bounds: &'static [f64],
    buckets: Box<[AtomicU64]>,
    count: AtomicU64,
    sum_bits: AtomicU64,
}

impl AtomicHistogram {
    pub(crate) fn new(bounds: &'static [f64]) -> Self {
        Self {
            bounds,
            buckets: bounds.iter().map(|_| AtomicU64::new(0)).collect(),
            count: AtomicU64::new(0),
            sum_bits: AtomicU64::new(0f64.to_bits()),
        }
    }

    /// Observe a value in seconds and increment cumulative buckets.
    pub(crate) fn observe(&self, value: f64) {
        for (bucket, bound) in self.buckets.iter().zip(self.bounds) {
            if value <= *bound {
                bucket.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.count.fetch_add(1, Ordering::Relaxed);
        // The closure never returns None, so the update cannot fail.
        let _ = self
            .sum_bits
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                Some((f64::from_bits(bits) + value).to_bits())
            });
    }

    pub(crate) fn into_snapshot(self) -> HistogramSnapshot {
        HistogramSnapshot {
            bounds: self.bounds,
            buckets: self.buckets.into_vec().into_iter().map(AtomicU64::into_inner).collect(),
            count: self.count.into_inner(),
            sum: f64::from_bits(self.sum_bits.into_inner()),
        }
    }
}

/// Captured state of one histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    bounds: &'static [f64],
    buckets: Vec<u64>,
    count: u64,
    sum: f64,
}

impl HistogramSnapshot {
    /// `(upper bound, cumulative count)` pairs in increasing bound order.
    pub fn buckets(&self) -> impl Iterator<Item = (f64, u64)> + '_ {
        self.bounds.iter().copied().zip(self.buckets.iter().copied())
    }

    /// Cumulative count of the bucket with exactly this bound.
    pub fn bucket(&self, bound: f64) -> Option<u64> {
        self.buckets().find(|(b, _)| *b == bound).map(|(_, n)| n)
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: [f64; 4] = [0.1, 1.0, 10.0, f64::INFINITY];

    #[test]
    fn observation_fills_every_bucket_at_or_above_value() {
        let h = AtomicHistogram::new(&BOUNDS);
        h.observe(1.0);
        let snap = h.into_snapshot();
        let counts: Vec<u64> = snap.buckets().map(|(_, n)| n).collect();
        assert_eq!(counts, vec![0, 1, 1, 1]);
        assert_eq!(snap.count(), 1);
        assert_eq!(snap.sum(), 1.0);
    }

    #[test]
    fn inf_bucket_matches_count_and_buckets_are_monotonic() {
        let h = AtomicHistogram::new(&BOUNDS);
        for v in [0.05, 0.5, 5.0, 50.0, 500.0, 0.1] {
            h.observe(v);
        }
        let snap = h.into_snapshot();
        assert_eq!(snap.bucket(f64::INFINITY), Some(snap.count()));
        assert_eq!(snap.count(), 6);
        let counts: Vec<u64> = snap.buckets().map(|(_, n)| n).collect();
        assert!(counts.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(counts, vec![2, 3, 4, 6]);
        assert!((snap.sum() - 555.65).abs() < 1e-9);
    }
}
