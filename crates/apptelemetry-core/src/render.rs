//! Exposition text rendering.
//!
//! One series per line:
//!
//! ```text
//! sdk_kv_r_total{agent="...",bucket="default",node="a.example.com"} 1 1700000000000
//! sdk_query_duration_seconds_bucket{le="0.1",agent="...",bucket="default",node="a"} 0 1700000000000
//! sdk_query_duration_seconds_sum{agent="...",bucket="default",node="a"} 2
//! sdk_query_duration_seconds_count{agent="...",bucket="default",node="a"} 1
//! ```
//!
//! Counter and bucket lines carry the capture timestamp; `_sum` and `_count`
//! lines do not. Consumers of the existing format depend on that asymmetry.
//! All values are rounded to integers for display.

use crate::key::DimensionKey;
use crate::store::Snapshot;

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Render an `le` label: `+Inf` for the sentinel, shortest decimal otherwise.
fn bound_label(bound: f64) -> String {
    if bound.is_infinite() {
        "+Inf".to_string()
    } else {
        bound.to_string()
    }
}

fn dimension_labels(agent: &str, key: &DimensionKey) -> String {
    format!(
        "agent=\"{}\",bucket=\"{}\",node=\"{}\"",
        escape_label(agent),
        escape_label(key.bucket()),
        escape_label(key.host())
    )
}

/// Render every series in `snapshot` as one line each, counters first.
pub fn render_lines(snapshot: &Snapshot, agent: &str) -> Vec<String> {
    let ts = snapshot.timestamp_ms;
    let mut lines = Vec::new();

    for ((key, outcome), value) in &snapshot.counters {
        let name = outcome.metric_name(key.category());
        let labels = dimension_labels(agent, key);
        lines.push(format!("{name}{{{labels}}} {value} {ts}"));
    }

    for ((key, family), hist) in &snapshot.histograms {
        let name = family.metric_name();
        let labels = dimension_labels(agent, key);
        for (bound, count) in hist.buckets() {
            let le = bound_label(bound);
            lines.push(format!("{name}_bucket{{le=\"{le}\",{labels}}} {count} {ts}"));
        }
        lines.push(format!("{name}_sum{{{labels}}} {}", hist.sum().round() as i64));
        lines.push(format!("{name}_count{{{labels}}} {}", hist.count()));
    }

    lines
}

/// Render `snapshot` as newline-joined exposition text (no trailing newline).
pub fn render(snapshot: &Snapshot, agent: &str) -> String {
    render_lines(snapshot, agent).join("\n")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::key::{Category, KvOperation, Outcome};
    use crate::store::{FixedKvPolicy, TelemetryStore};

    const AGENT: &str = "test/0.0.0";

    #[test]
    fn bound_labels_are_shortest_decimal() {
        assert_eq!(bound_label(0.001), "0.001");
        assert_eq!(bound_label(1.0), "1");
        assert_eq!(bound_label(2.5), "2.5");
        assert_eq!(bound_label(10.0), "10");
        assert_eq!(bound_label(30.0), "30");
        assert_eq!(bound_label(f64::INFINITY), "+Inf");
    }

    #[test]
    fn empty_snapshot_renders_nothing() {
        let snap = TelemetryStore::new().export();
        assert!(render_lines(&snap, AGENT).is_empty());
        assert_eq!(render(&snap, AGENT), "");
    }

    #[test]
    fn counter_line_format() {
        let store = TelemetryStore::new();
        let key = DimensionKey::new(Category::Analytics, "foo", "example.net").unwrap();
        store.record_outcome(&key, Outcome::UnambiguousTimeout);
        store.record_outcome(&key, Outcome::UnambiguousTimeout);
        let snap = store.export();

        let lines = render_lines(&snap, AGENT);
        assert_eq!(
            lines,
            vec![format!(
                "sdk_analytics_r_utimedout{{agent=\"test/0.0.0\",bucket=\"foo\",node=\"example.net\"}} 2 {}",
                snap.timestamp_ms
            )]
        );
    }

    #[test]
    fn histogram_lines_omit_timestamp_on_sum_and_count() {
        let store = TelemetryStore::new();
        let key = DimensionKey::new(Category::Query, "default", "h").unwrap();
        store.record_latency(&key, 12.4);
        let snap = store.export();
        let ts = snap.timestamp_ms;
        let labels = "agent=\"test/0.0.0\",bucket=\"default\",node=\"h\"";

        let lines = render_lines(&snap, AGENT);
        let expected = vec![
            format!("sdk_query_duration_seconds_bucket{{le=\"0.1\",{labels}}} 0 {ts}"),
            format!("sdk_query_duration_seconds_bucket{{le=\"1\",{labels}}} 0 {ts}"),
            format!("sdk_query_duration_seconds_bucket{{le=\"10\",{labels}}} 0 {ts}"),
            format!("sdk_query_duration_seconds_bucket{{le=\"30\",{labels}}} 1 {ts}"),
            format!("sdk_query_duration_seconds_bucket{{le=\"75\",{labels}}} 1 {ts}"),
            format!("sdk_query_duration_seconds_bucket{{le=\"+Inf\",{labels}}} 1 {ts}"),
            format!("sdk_query_duration_seconds_sum{{{labels}}} 12"),
            format!("sdk_query_duration_seconds_count{{{labels}}} 1"),
        ];
        assert_eq!(lines, expected);
    }

    #[test]
    fn label_values_are_escaped() {
        let store = TelemetryStore::with_kv_policy(FixedKvPolicy(KvOperation::Retrieval));
        let key = DimensionKey::new(Category::Kv, "we\"ird", "h").unwrap();
        store.total(&key);
        let text = render(&store.export(), "a\\b");
        assert!(text.contains("agent=\"a\\\\b\",bucket=\"we\\\"ird\""), "{text}");
    }

    #[test]
    fn rendering_is_stable_for_one_snapshot() {
        let store = TelemetryStore::new();
        for bucket in ["default", "foo", "bar"] {
            for cat in Category::ALL {
                let key = DimensionKey::new(cat, bucket, "example.com").unwrap();
                store.total(&key);
                store.record_latency(&key, 0.3);
            }
        }
        let snap = store.export();
        assert_eq!(render(&snap, AGENT), render(&snap, AGENT));
    }
}
