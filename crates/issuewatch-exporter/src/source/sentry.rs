//! Sentry Web API collaborator.
//!
//! Lists the organization's projects, then per project (at most
//! `max_concurrent_projects` at a time):
//! - unresolved issues for each enabled `statsPeriod`, counted by level
//! - events received over the last 24 hours from the project stats series

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use issuewatch_core::{IssueWatchError, Result, Snapshot};

use super::render::{render_prometheus, IssueCount, ProjectReport};
use super::SnapshotSource;
use crate::config::SentrySection;

// Upper bound on followed `Link: rel="next"` pages per listing.
pub const MAX_PAGES: usize = 50;

const USER_AGENT: &str = concat!("issuewatch/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    #[serde(default = "unknown_level")]
    pub level: String,
}

fn unknown_level() -> String {
    "unknown".into()
}

/// Thin typed wrapper over the REST endpoints the exporter reads.
///
/// One pooled `reqwest::Client` carries the bearer token, the timeout and the
/// user agent; proxy variables and redirects follow reqwest's defaults.
pub struct SentryApi {
    client: Client,
    base_url: String,
}

impl SentryApi {
    pub fn new(base_url: String, token: &str, timeout: Duration) -> Result<Self> {
        let mut auth: HeaderValue = format!("Bearer {token}")
            .parse()
            .map_err(|e| IssueWatchError::Config(format!("invalid auth token: {e}")))?;
        auth.set_sensitive(true);

        let mut default_headers = HeaderMap::new();
        default_headers.insert(AUTHORIZATION, auth);
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(default_headers)
            .build()
            .map_err(|e| IssueWatchError::Internal(format!("building http client: {e}")))?;

        Ok(Self { client, base_url })
    }

    pub async fn projects(&self, org: &str) -> Result<Vec<Project>> {
        self.get_all(&format!("organizations/{org}/projects/")).await
    }

    pub async fn unresolved_issues(&self, org: &str, project: &str, period: &str) -> Result<Vec<Issue>> {
        self.get_all(&format!(
            "projects/{org}/{project}/issues/?query=is:unresolved&statsPeriod={period}"
        ))
        .await
    }

    pub async fn events_received_24h(&self, org: &str, project: &str) -> Result<u64> {
        let (series, _): (Vec<(i64, u64)>, _) = self
            .get_page(&format!("projects/{org}/{project}/stats/?stat=received&resolution=1h"))
            .await?;
        Ok(series.iter().map(|(_, n)| n).sum())
    }

    /// Follow cursor pagination to the end. Running out of pages is an error:
    /// a truncated listing would publish under-counted metrics.
    async fn get_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let page_path = match &cursor {
                None => path.to_string(),
                Some(c) => {
                    let sep = if path.contains('?') { '&' } else { '?' };
                    format!("{path}{sep}cursor={c}")
                }
            };
            let (page, next): (Vec<T>, _) = self.get_page(&page_path).await?;
            items.extend(page);
            match next {
                Some(c) => cursor = Some(c),
                None => return Ok(items),
            }
        }

        warn!(%path, max_pages = MAX_PAGES, "pagination limit reached");
        Err(IssueWatchError::upstream(format!(
            "GET {path}: more than {MAX_PAGES} pages, refusing to publish a truncated listing"
        )))
    }

    async fn get_page<T: DeserializeOwned>(&self, path: &str) -> Result<(T, Option<String>)> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| IssueWatchError::upstream_with(format!("GET {url}"), e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(IssueWatchError::upstream(format!("GET {url} returned {status}")));
        }

        let next = resp
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_cursor);
        let body = resp.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                IssueWatchError::decode(format!("GET {url}"), e)
            } else {
                IssueWatchError::upstream_with(format!("GET {url}: reading body"), e)
            }
        })?;
        debug!(%url, "fetched page");
        Ok((body, next))
    }
}

/// Cursor of the `rel="next"` link, if Sentry says it has results.
pub fn next_cursor(link: &str) -> Option<String> {
    link.split(',')
        .filter(|part| part.contains("rel=\"next\"") && part.contains("results=\"true\""))
        .find_map(|part| {
            part.split(';')
                .map(str::trim)
                .find_map(|attr| attr.strip_prefix("cursor=\""))
                .and_then(|rest| rest.strip_suffix('"'))
                .map(String::from)
        })
}

/// `SnapshotSource` producing Sentry issue/event metrics.
pub struct SentrySource {
    api: SentryApi,
    cfg: SentrySection,
}

impl SentrySource {
    pub fn new(cfg: SentrySection) -> Result<Self> {
        let api = SentryApi::new(cfg.normalized_base_url(), &cfg.auth_token, cfg.request_timeout())?;
        Ok(Self { api, cfg })
    }

    async fn project_report(&self, project: &Project) -> Result<ProjectReport> {
        let org = &self.cfg.org;
        let mut report = ProjectReport { slug: project.slug.clone(), ..Default::default() };

        for period in self.cfg.issue_windows() {
            let issues = self.api.unresolved_issues(org, &project.slug, period).await?;
            let mut by_level: BTreeMap<String, u64> = BTreeMap::new();
            for issue in issues {
                *by_level.entry(issue.level).or_default() += 1;
            }
            report.issues.extend(
                by_level
                    .into_iter()
                    .map(|(level, count)| IssueCount { period, level, count }),
            );
        }

        if self.cfg.scrape_event_metrics {
            report.events_24h = Some(self.api.events_received_24h(org, &project.slug).await?);
        }
        Ok(report)
    }
}

#[async_trait]
impl SnapshotSource for SentrySource {
    fn name(&self) -> &'static str {
        "sentry"
    }

    async fn produce(&self) -> Result<Snapshot> {
        let org = &self.cfg.org;
        let mut projects = self.api.projects(org).await?;

        if !self.cfg.projects.is_empty() {
            for wanted in &self.cfg.projects {
                if !projects.iter().any(|p| &p.slug == wanted) {
                    warn!(%org, project = %wanted, "configured project not found in organization");
                }
            }
            projects.retain(|p| self.cfg.projects.contains(&p.slug));
        }
        projects.sort_by(|a, b| a.slug.cmp(&b.slug));

        // `buffered` keeps input order, so rendering stays sorted by slug.
        let pending: Vec<_> = projects.iter().map(|p| self.project_report(p)).collect();
        let reports: Vec<ProjectReport> = stream::iter(pending)
            .buffered(self.cfg.max_concurrent_projects)
            .try_collect()
            .await?;
        Ok(Snapshot::from(render_prometheus(org, &reports)))
    }
}
