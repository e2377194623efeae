//! Minimal metrics registry for the gateway.
//!
//! Counter and histogram types with dynamic labels backed by `DashMap`. Labels
//! are flattened into sorted key vectors to keep deterministic ordering.
//! Histogram buckets are fixed in microseconds to avoid floating point math.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

type LabelKey = Vec<(String, String)>;

fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn render_labels(key: &LabelKey) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value for an exact label set (0 if never touched).
    #[cfg(test)]
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} counter", name);
        for r in self.map.iter() {
            let val = r.value().load(Ordering::Relaxed);
            let _ = writeln!(out, "{}{{{}}} {}", name, render_labels(r.key()), val);
        }
    }
}

// 100us, 500us, 1ms, 5ms, 10ms, 50ms, 100ms, 500ms, 1s
const BUCKETS_MICROS: [u64; 9] = [
    100, 500, 1_000, 5_000, 10_000, 50_000, 100_000, 500_000, 1_000_000,
];

#[derive(Default)]
struct AtomicHistogram {
    count: AtomicU64,
    sum: AtomicU64,
    buckets: [AtomicU64; 9],
}

#[derive(Default)]
pub struct HistogramVec {
    map: DashMap<LabelKey, AtomicHistogram>,
}

impl HistogramVec {
    /// Record one duration. Buckets are cumulative, so every bucket whose
    /// bound is at or above the value is bumped.
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        let hist = self.map.entry(label_key(labels)).or_default();

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum.fetch_add(micros, Ordering::Relaxed);
        let first = BUCKETS_MICROS.partition_point(|&le| le < micros);
        for bucket in &hist.buckets[first..] {
            bucket.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} histogram");
        for r in self.map.iter() {
            let (labels, hist) = (render_labels(r.key()), r.value());
            let sep = if labels.is_empty() { "" } else { "," };
            let count = hist.count.load(Ordering::Relaxed);

            let bounds = BUCKETS_MICROS.iter().map(u64::to_string).chain(["+Inf".to_string()]);
            let counts = hist.buckets.iter().map(|b| b.load(Ordering::Relaxed)).chain([count]);
            for (le, n) in bounds.zip(counts) {
                let _ = writeln!(out, "{name}_bucket{{{labels}{sep}le=\"{le}\"}} {n}");
            }
            let _ = writeln!(out, "{name}_sum{{{labels}}} {}", hist.sum.load(Ordering::Relaxed));
            let _ = writeln!(out, "{name}_count{{{labels}}} {count}");
        }
    }
}

#[derive(Default)]
pub struct GatewayMetrics {
    /// Batches by outcome: ok | failed | bad_request.
    pub batches: CounterVec,
    /// Items by result: dispatched | rejected.
    pub items: CounterVec,
    /// Document store failures by backend.
    pub store_errors: CounterVec,
    /// Sink writes by result: ok | failed | skipped | dropped.
    pub sink_writes: CounterVec,
    pub batch_duration: HistogramVec, // In Microseconds
    draining: AtomicBool,
}

impl GatewayMetrics {
    /// Mark draining state.
    pub fn set_draining(&self) {
        self.draining.store(true, Ordering::Relaxed);
    }
    /// Return whether draining is active.
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Relaxed)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.batches.render("datalogger_batches_total", &mut out);
        self.items.render("datalogger_items_total", &mut out);
        self.store_errors.render("datalogger_store_errors_total", &mut out);
        self.sink_writes.render("datalogger_sink_writes_total", &mut out);
        self.batch_duration
            .render("datalogger_batch_duration_micros", &mut out);

        let _ = writeln!(
            out,
            "# TYPE datalogger_draining gauge\ndatalogger_draining {}",
            if self.is_draining() { 1 } else { 0 }
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_labels_are_order_independent() {
        let c = CounterVec::default();
        c.inc(&[("a", "1"), ("b", "2")]);
        c.add(&[("b", "2"), ("a", "1")], 2);
        assert_eq!(c.get(&[("a", "1"), ("b", "2")]), 3);
    }

    #[test]
    fn renders_cumulative_buckets() {
        let m = GatewayMetrics::default();
        m.batch_duration.observe(&[("outcome", "ok")], Duration::from_micros(700));
        m.batches.inc(&[("outcome", "ok")]);
        let text = m.render();
        assert!(text.contains("datalogger_batches_total{outcome=\"ok\"} 1"));
        assert!(text.contains("datalogger_batch_duration_micros_bucket{outcome=\"ok\",le=\"500\"} 0"));
        assert!(text.contains("datalogger_batch_duration_micros_bucket{outcome=\"ok\",le=\"1000\"} 1"));
        assert!(text.contains("datalogger_draining 0"));
    }
}
