//! Exporter config loader.
//!
//! Two sources share one schema and one `validate()`:
//! - a YAML file (strict: unknown fields are rejected)
//! - process environment variables

pub mod schema;

use std::fs;
use std::path::PathBuf;

use issuewatch_core::error::{IssueWatchError, Result};

pub use schema::{
    ExporterConfig, RefreshSection, SentrySection, ServerSection, StoreKind, StoreSection,
};

/// Points at a YAML file that replaces environment-based configuration.
pub const CONFIG_PATH_ENV: &str = "ISSUEWATCH_CONFIG";

pub fn load_from_file(path: &str) -> Result<ExporterConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| IssueWatchError::Config(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    let cfg: ExporterConfig = serde_yaml::from_str(s)
        .map_err(|e| IssueWatchError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load from the process environment.
pub fn from_env() -> Result<ExporterConfig> {
    from_env_with(|key| std::env::var(key).ok())
}

/// Load from an arbitrary variable lookup. Empty values count as unset.
pub fn from_env_with<F>(lookup: F) -> Result<ExporterConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let mut server = ServerSection::default();
    if let Some(listen) = get("EXPORTER_LISTEN") {
        server.listen = listen;
    }

    let mut refresh = RefreshSection::default();
    if let Some(v) = get("QUERY_SENTRY_EVERY_SECONDS") {
        refresh.interval_secs = parse_u64("QUERY_SENTRY_EVERY_SECONDS", &v)?;
    }

    let scrape_issue_metrics = get_bool(&get, "SENTRY_SCRAPE_ISSUE_METRICS")?.unwrap_or(true);
    let sentry = SentrySection {
        base_url: get("SENTRY_BASE_URL").unwrap_or_else(|| "https://sentry.io/api/0/".into()),
        auth_token: get("SENTRY_AUTH_TOKEN").unwrap_or_default(),
        org: get("SENTRY_EXPORTER_ORG").unwrap_or_default(),
        projects: get("SENTRY_EXPORTER_PROJECTS")
            .map(|v| split_list(&v))
            .unwrap_or_default(),
        request_timeout_secs: match get("SENTRY_REQUEST_TIMEOUT_SECONDS") {
            Some(v) => parse_u64("SENTRY_REQUEST_TIMEOUT_SECONDS", &v)?,
            None => 30,
        },
        max_concurrent_projects: match get("SENTRY_MAX_CONCURRENT_PROJECTS") {
            Some(v) => parse_u64("SENTRY_MAX_CONCURRENT_PROJECTS", &v)? as usize,
            None => 4,
        },
        scrape_issue_metrics,
        scrape_event_metrics: get_bool(&get, "SENTRY_SCRAPE_EVENT_METRICS")?.unwrap_or(true),
        issues_1h: get_bool(&get, "SENTRY_ISSUES_1H")?,
        issues_24h: get_bool(&get, "SENTRY_ISSUES_24H")?,
        issues_14d: get_bool(&get, "SENTRY_ISSUES_14D")?,
    };

    let mut store = StoreSection::default();
    if let Some(kind) = get("EXPORTER_STORE") {
        store.kind = match kind.to_ascii_lowercase().as_str() {
            "memory" => StoreKind::Memory,
            "file" => StoreKind::File,
            other => {
                return Err(IssueWatchError::Config(format!(
                    "EXPORTER_STORE must be `memory` or `file`, got `{other}`"
                )))
            }
        };
    }
    if let Some(path) = get("EXPORTER_STORE_PATH") {
        store.path = PathBuf::from(path);
    }

    let cfg = ExporterConfig { server, refresh, sentry, store };
    cfg.validate()?;
    Ok(cfg)
}

fn parse_u64(key: &str, v: &str) -> Result<u64> {
    v.parse()
        .map_err(|_| IssueWatchError::Config(format!("{key} must be a non-negative integer, got `{v}`")))
}

fn get_bool<G>(get: &G, key: &str) -> Result<Option<bool>>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(None),
        Some(v) => match v.to_ascii_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(IssueWatchError::Config(format!("{key} must be `true` or `false`, got `{v}`"))),
        },
    }
}

fn split_list(v: &str) -> Vec<String> {
    v.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
