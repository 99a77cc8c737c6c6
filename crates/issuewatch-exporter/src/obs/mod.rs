//! Exporter self-observability.
//!
//! `metrics` keeps refresh outcomes as atomics, rendered by the
//! `/metrics/exporter` handler separately from the upstream snapshot.
//! `logging` installs the tracing subscriber.

pub mod logging;
pub mod metrics;

pub use metrics::ExporterMetrics;
