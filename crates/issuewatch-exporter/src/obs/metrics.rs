//! Self-metrics registry.
//!
//! Counters and the histogram carry dynamic labels backed by `DashMap`. Label
//! sets are flattened into sorted key vectors to keep rendering
//! deterministic. Histogram buckets are fixed in microseconds.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use issuewatch_core::TickOutcome;

/// Escape a label value for the text exposition format.
pub fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_key(labels: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut key: Vec<(String, String)> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn label_str(key: &[(String, String)]) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<Vec<(String, String)>, AtomicU64>,
}

impl CounterVec {
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", name, help);
        let _ = writeln!(out, "# TYPE {} counter", name);
        let mut rows: Vec<(String, u64)> = self
            .map
            .iter()
            .map(|r| (label_str(r.key()), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort();
        for (labels, val) in rows {
            let _ = writeln!(out, "{}{{{}}} {}", name, labels, val);
        }
    }
}

// 1ms, 10ms, 100ms, 500ms, 1s, 5s, 10s, 30s, 60s
const BUCKETS_MICROS: [u64; 9] = [
    1_000, 10_000, 100_000, 500_000, 1_000_000, 5_000_000, 10_000_000, 30_000_000, 60_000_000,
];

#[derive(Default)]
pub struct Histogram {
    count: AtomicU64,
    sum: AtomicU64,
    buckets: [AtomicU64; 9],
}

impl Histogram {
    pub fn observe(&self, duration: Duration) {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum.fetch_add(micros, Ordering::Relaxed);
        for (i, &b) in BUCKETS_MICROS.iter().enumerate() {
            if micros <= b {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", name, help);
        let _ = writeln!(out, "# TYPE {} histogram", name);
        for (i, &le) in BUCKETS_MICROS.iter().enumerate() {
            let count = self.buckets[i].load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_bucket{{le=\"{}\"}} {}", name, le, count);
        }
        let count = self.count.load(Ordering::Relaxed);
        let _ = writeln!(out, "{}_bucket{{le=\"+Inf\"}} {}", name, count);
        let _ = writeln!(out, "{}_sum {}", name, self.sum.load(Ordering::Relaxed));
        let _ = writeln!(out, "{}_count {}", name, count);
    }
}

#[derive(Default)]
pub struct ExporterMetrics {
    pub refreshes: CounterVec,
    pub refresh_failures: CounterVec,
    pub refresh_duration: Histogram, // In Microseconds
    last_success_unix: AtomicU64,
    snapshot_bytes: AtomicU64,
}

impl ExporterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one finished tick.
    pub fn record(&self, outcome: &TickOutcome) {
        self.refreshes.inc(&[("outcome", outcome.label())]);
        self.refresh_duration.observe(outcome.took());
        match outcome {
            TickOutcome::Updated { bytes, .. } => {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or(0);
                self.last_success_unix.store(now, Ordering::Relaxed);
                self.snapshot_bytes.store(*bytes as u64, Ordering::Relaxed);
            }
            TickOutcome::Failed { reason, .. } => {
                self.refresh_failures.inc(&[("kind", reason.kind().as_str())]);
            }
        }
    }

    pub fn last_success_unix(&self) -> u64 {
        self.last_success_unix.load(Ordering::Relaxed)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.refreshes.render(
            "issuewatch_refresh_total",
            "Refresh ticks by outcome.",
            &mut out,
        );
        self.refresh_failures.render(
            "issuewatch_refresh_failures_total",
            "Failed refresh ticks by error kind.",
            &mut out,
        );
        self.refresh_duration.render(
            "issuewatch_refresh_duration_micros",
            "Wall time of refresh ticks in microseconds.",
            &mut out,
        );
        let _ = writeln!(
            out,
            "# HELP issuewatch_last_success_unix_seconds Completion time of the last successful refresh.\n\
             # TYPE issuewatch_last_success_unix_seconds gauge\n\
             issuewatch_last_success_unix_seconds {}",
            self.last_success_unix()
        );
        let _ = writeln!(
            out,
            "# HELP issuewatch_snapshot_bytes Size of the published snapshot.\n\
             # TYPE issuewatch_snapshot_bytes gauge\n\
             issuewatch_snapshot_bytes {}",
            self.snapshot_bytes.load(Ordering::Relaxed)
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use issuewatch_core::IssueWatchError;

    #[test]
    fn failures_are_counted_by_kind() {
        let m = ExporterMetrics::new();
        m.record(&TickOutcome::Failed {
            reason: IssueWatchError::upstream("503"),
            took: Duration::from_millis(3),
        });
        m.record(&TickOutcome::Updated { bytes: 42, took: Duration::from_millis(8) });

        assert_eq!(m.refreshes.get(&[("outcome", "failed")]), 1);
        assert_eq!(m.refreshes.get(&[("outcome", "updated")]), 1);
        assert_eq!(m.refresh_failures.get(&[("kind", "UPSTREAM")]), 1);

        let text = m.render();
        assert!(text.contains("issuewatch_refresh_total{outcome=\"failed\"} 1"));
        assert!(text.contains("issuewatch_refresh_duration_micros_count 2"));
        assert!(text.contains("issuewatch_snapshot_bytes 42"));
    }

    #[test]
    fn escapes_quotes_and_newlines() {
        assert_eq!(escape_label("a\"b\nc\\"), "a\\\"b\\nc\\\\");
    }
}
