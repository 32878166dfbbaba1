//! Metric addressing.
//!
//! A sample is classified by a [`DimensionKey`] (category, bucket, host) plus
//! either an [`Outcome`] (counters) or a [`HistogramFamily`] (latencies).
//! Metric names and bucket boundaries are derived from these, never supplied
//! by callers.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TelemetryError};

/// Operation category of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Kv,
    Query,
    Search,
    Analytics,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Kv,
        Category::Query,
        Category::Search,
        Category::Analytics,
    ];

    /// Name used inside metric names (`sdk_<category>_...`).
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Kv => "kv",
            Category::Query => "query",
            Category::Search => "search",
            Category::Analytics => "analytics",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "kv" => Ok(Category::Kv),
            "query" => Ok(Category::Query),
            "search" => Ok(Category::Search),
            "analytics" => Ok(Category::Analytics),
            other => Err(TelemetryError::UnknownCategory(other.to_string())),
        }
    }
}

/// Request outcome tracked by a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    Total,
    AmbiguousTimeout,
    UnambiguousTimeout,
    Cancelled,
}

impl Outcome {
    pub const ALL: [Outcome; 4] = [
        Outcome::Total,
        Outcome::AmbiguousTimeout,
        Outcome::UnambiguousTimeout,
        Outcome::Cancelled,
    ];

    fn suffix(self) -> &'static str {
        match self {
            Outcome::Total => "r_total",
            Outcome::AmbiguousTimeout => "r_atimedout",
            Outcome::UnambiguousTimeout => "r_utimedout",
            Outcome::Cancelled => "r_canceled",
        }
    }

    /// Counter metric name for this outcome within `category`.
    pub fn metric_name(self, category: Category) -> String {
        format!("sdk_{}_{}", category.as_str(), self.suffix())
    }
}

/// Kv sub-operation a latency can be attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KvOperation {
    Retrieval,
    MutationDurable,
    MutationNondurable,
}

impl KvOperation {
    pub const ALL: [KvOperation; 3] = [
        KvOperation::Retrieval,
        KvOperation::MutationDurable,
        KvOperation::MutationNondurable,
    ];
}

// Upper bounds in seconds. Every family ends with the +Inf sentinel.
const KV_BOUNDS: [f64; 7] = [0.001, 0.01, 0.1, 0.5, 1.0, 2.5, f64::INFINITY];
const KV_DURABLE_BOUNDS: [f64; 7] = [0.01, 0.1, 1.0, 2.0, 5.0, 10.0, f64::INFINITY];
const SERVICE_BOUNDS: [f64; 6] = [0.1, 1.0, 10.0, 30.0, 75.0, f64::INFINITY];

/// Latency histogram family: one per non-kv category, three for kv.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HistogramFamily {
    Kv(KvOperation),
    Query,
    Search,
    Analytics,
}

impl HistogramFamily {
    /// Family for a non-kv category. Returns `None` for kv, which needs a
    /// sub-operation to pick one of its three families.
    pub fn for_service(category: Category) -> Option<Self> {
        match category {
            Category::Kv => None,
            Category::Query => Some(HistogramFamily::Query),
            Category::Search => Some(HistogramFamily::Search),
            Category::Analytics => Some(HistogramFamily::Analytics),
        }
    }

    pub fn category(self) -> Category {
        match self {
            HistogramFamily::Kv(_) => Category::Kv,
            HistogramFamily::Query => Category::Query,
            HistogramFamily::Search => Category::Search,
            HistogramFamily::Analytics => Category::Analytics,
        }
    }

    pub fn metric_name(self) -> &'static str {
        match self {
            HistogramFamily::Kv(KvOperation::Retrieval) => "sdk_kv_retrieval_duration_seconds",
            HistogramFamily::Kv(KvOperation::MutationDurable) => {
                "sdk_kv_mutation_durable_duration_seconds"
            }
            HistogramFamily::Kv(KvOperation::MutationNondurable) => {
                "sdk_kv_mutation_nondurable_duration_seconds"
            }
            HistogramFamily::Query => "sdk_query_duration_seconds",
            HistogramFamily::Search => "sdk_search_duration_seconds",
            HistogramFamily::Analytics => "sdk_analytics_duration_seconds",
        }
    }

    /// Strictly increasing upper bounds, terminated by `f64::INFINITY`.
    pub fn bounds(self) -> &'static [f64] {
        match self {
            HistogramFamily::Kv(KvOperation::Retrieval)
            | HistogramFamily::Kv(KvOperation::MutationNondurable) => &KV_BOUNDS,
            HistogramFamily::Kv(KvOperation::MutationDurable) => &KV_DURABLE_BOUNDS,
            HistogramFamily::Query | HistogramFamily::Search | HistogramFamily::Analytics => {
                &SERVICE_BOUNDS
            }
        }
    }
}

/// (category, bucket, host) triple addressing a metric slot.
///
/// Bucket and host are guaranteed non-empty; construction is the only place a
/// malformed key can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DimensionKey {
    category: Category,
    bucket: String,
    host: String,
}

impl DimensionKey {
    pub fn new(category: Category, bucket: impl Into<String>, host: impl Into<String>) -> Result<Self> {
        let bucket = bucket.into();
        let host = host.into();
        if bucket.is_empty() {
            return Err(TelemetryError::InvalidKey("bucket must not be empty".into()));
        }
        if host.is_empty() {
            return Err(TelemetryError::InvalidKey("host must not be empty".into()));
        }
        Ok(Self { category, bucket, host })
    }

    /// Parse the category from its metric-name form, then validate as [`DimensionKey::new`].
    pub fn parse(category: &str, bucket: impl Into<String>, host: impl Into<String>) -> Result<Self> {
        Self::new(category.parse()?, bucket, host)
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn rejects_empty_bucket_and_host() {
        assert!(matches!(
            DimensionKey::new(Category::Kv, "", "a.example.com"),
            Err(TelemetryError::InvalidKey(_))
        ));
        assert!(matches!(
            DimensionKey::new(Category::Kv, "default", ""),
            Err(TelemetryError::InvalidKey(_))
        ));
    }

    #[test]
    fn rejects_unknown_category() {
        let err = DimensionKey::parse("views", "default", "a.example.com").expect_err("must fail");
        assert!(matches!(err, TelemetryError::UnknownCategory(c) if c == "views"));
    }

    #[test]
    fn counter_names_follow_category() {
        assert_eq!(Outcome::Total.metric_name(Category::Kv), "sdk_kv_r_total");
        assert_eq!(
            Outcome::AmbiguousTimeout.metric_name(Category::Query),
            "sdk_query_r_atimedout"
        );
        assert_eq!(
            Outcome::UnambiguousTimeout.metric_name(Category::Search),
            "sdk_search_r_utimedout"
        );
        assert_eq!(
            Outcome::Cancelled.metric_name(Category::Analytics),
            "sdk_analytics_r_canceled"
        );
    }

    #[test]
    fn bounds_are_increasing_and_end_with_inf() {
        let families = KvOperation::ALL
            .iter()
            .map(|op| HistogramFamily::Kv(*op))
            .chain(Category::ALL.iter().filter_map(|c| HistogramFamily::for_service(*c)));
        for family in families {
            let bounds = family.bounds();
            assert!(bounds.windows(2).all(|w| w[0] < w[1]), "{family:?}");
            assert_eq!(bounds.last().copied(), Some(f64::INFINITY), "{family:?}");
        }
    }

    #[test]
    fn kv_has_no_service_family() {
        assert_eq!(HistogramFamily::for_service(Category::Kv), None);
        assert_eq!(
            HistogramFamily::for_service(Category::Search).map(HistogramFamily::metric_name),
            Some("sdk_search_duration_seconds")
        );
    }
}
