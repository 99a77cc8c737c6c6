//! issuewatch exporter library.
//!
//! Polls the Sentry API on a fixed cadence, renders the result as Prometheus
//! text and serves the latest complete rendering over HTTP. Readers never
//! wait for a refresh in flight and never see a half-written snapshot.
//! Consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod refresh;
pub mod router;
pub mod scheduler;
pub mod server;
pub mod source;
pub mod store;
