use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use issuewatch_core::error::{IssueWatchError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub refresh: RefreshSection,

    pub sentry: SentrySection,

    #[serde(default)]
    pub store: StoreSection,
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.refresh.validate()?;
        self.sentry.validate()?;
        self.store.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { listen: default_listen() }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            IssueWatchError::Config(format!("server.listen must be a valid SocketAddr ({}): {e}", self.listen))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshSection {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for RefreshSection {
    fn default() -> Self {
        Self { interval_secs: default_interval_secs() }
    }
}

impl RefreshSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=86_400).contains(&self.interval_secs) {
            return Err(IssueWatchError::Config(
                "refresh.interval_secs must be between 1 and 86400".into(),
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SentrySection {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub auth_token: String,

    #[serde(default)]
    pub org: String,

    /// Project slugs to export. Empty means every project of the org.
    #[serde(default)]
    pub projects: Vec<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Projects fetched in parallel during one refresh.
    #[serde(default = "default_max_concurrent_projects")]
    pub max_concurrent_projects: usize,

    #[serde(default = "default_true")]
    pub scrape_issue_metrics: bool,

    #[serde(default = "default_true")]
    pub scrape_event_metrics: bool,

    // Unset windows follow scrape_issue_metrics.
    #[serde(default)]
    pub issues_1h: Option<bool>,
    #[serde(default)]
    pub issues_24h: Option<bool>,
    #[serde(default)]
    pub issues_14d: Option<bool>,
}

impl SentrySection {
    pub fn validate(&self) -> Result<()> {
        if self.auth_token.trim().is_empty() {
            return Err(IssueWatchError::Config("SENTRY_AUTH_TOKEN (sentry.auth_token) is required".into()));
        }
        if self.org.trim().is_empty() {
            return Err(IssueWatchError::Config("SENTRY_EXPORTER_ORG (sentry.org) is required".into()));
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(IssueWatchError::Config(format!(
                "sentry.base_url must be an http(s) URL, got {}",
                self.base_url
            )));
        }
        if !(1..=600).contains(&self.request_timeout_secs) {
            return Err(IssueWatchError::Config(
                "sentry.request_timeout_secs must be between 1 and 600".into(),
            ));
        }
        if !(1..=64).contains(&self.max_concurrent_projects) {
            return Err(IssueWatchError::Config(
                "sentry.max_concurrent_projects must be between 1 and 64".into(),
            ));
        }
        Ok(())
    }

    /// Base URL with exactly one trailing slash.
    pub fn normalized_base_url(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Enabled issue windows, as Sentry `statsPeriod` values.
    pub fn issue_windows(&self) -> Vec<&'static str> {
        let default = self.scrape_issue_metrics;
        [("1h", self.issues_1h), ("24h", self.issues_24h), ("14d", self.issues_14d)]
            .into_iter()
            .filter(|(_, on)| on.unwrap_or(default))
            .map(|(period, _)| period)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Memory,
    File,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    #[serde(default = "default_store_kind")]
    pub kind: StoreKind,

    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self { kind: default_store_kind(), path: default_store_path() }
    }
}

impl StoreSection {
    pub fn validate(&self) -> Result<()> {
        if self.kind == StoreKind::File && self.path.file_name().is_none() {
            return Err(IssueWatchError::Config("store.path must name a file".into()));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    // https://github.com/prometheus/prometheus/wiki/Default-port-allocations
    "0.0.0.0:9790".into()
}
fn default_interval_secs() -> u64 {
    300
}
fn default_base_url() -> String {
    "https://sentry.io/api/0/".into()
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_max_concurrent_projects() -> usize {
    4
}
fn default_true() -> bool {
    true
}
fn default_store_kind() -> StoreKind {
    StoreKind::Memory
}
fn default_store_path() -> PathBuf {
    PathBuf::from("/tmp/issuewatch.prom")
}
