//! Prometheus text exposition for upstream reports.

use std::fmt::Write;

use crate::obs::metrics::escape_label;

/// Unresolved issues of one level inside one stats window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueCount {
    pub period: &'static str,
    pub level: String,
    pub count: u64,
}

/// Everything fetched for one project during a refresh.
#[derive(Debug, Clone, Default)]
pub struct ProjectReport {
    pub slug: String,
    pub issues: Vec<IssueCount>,
    /// `None` when event scraping is disabled.
    pub events_24h: Option<u64>,
}

pub fn render_prometheus(org: &str, reports: &[ProjectReport]) -> String {
    let mut out = String::new();

    out.push_str("# HELP sentry_projects Number of exported projects.\n");
    out.push_str("# TYPE sentry_projects gauge\n");
    let _ = writeln!(out, "sentry_projects{{org=\"{}\"}} {}", escape_label(org), reports.len());

    if reports.iter().any(|r| !r.issues.is_empty()) {
        out.push_str("# HELP sentry_open_issues Unresolved issues seen in the window, by level.\n");
        out.push_str("# TYPE sentry_open_issues gauge\n");
        for r in reports {
            for i in &r.issues {
                let _ = writeln!(
                    out,
                    "sentry_open_issues{{project_slug=\"{}\",period=\"{}\",level=\"{}\"}} {}",
                    escape_label(&r.slug),
                    i.period,
                    escape_label(&i.level),
                    i.count
                );
            }
        }
    }

    if reports.iter().any(|r| r.events_24h.is_some()) {
        out.push_str("# HELP sentry_events_received_24h Events received in the last 24 hours.\n");
        out.push_str("# TYPE sentry_events_received_24h gauge\n");
        for r in reports {
            if let Some(n) = r.events_24h {
                let _ = writeln!(
                    out,
                    "sentry_events_received_24h{{project_slug=\"{}\"}} {}",
                    escape_label(&r.slug),
                    n
                );
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_headers_and_rows() {
        let reports = vec![ProjectReport {
            slug: "web".into(),
            issues: vec![IssueCount { period: "24h", level: "error".into(), count: 3 }],
            events_24h: Some(120),
        }];
        let text = render_prometheus("acme", &reports);

        assert!(text.starts_with("# HELP sentry_projects"));
        assert!(text.contains("sentry_projects{org=\"acme\"} 1\n"));
        assert!(text.contains("# TYPE sentry_open_issues gauge\n"));
        assert!(text.contains(
            "sentry_open_issues{project_slug=\"web\",period=\"24h\",level=\"error\"} 3\n"
        ));
        assert!(text.contains("sentry_events_received_24h{project_slug=\"web\"} 120\n"));
    }

    #[test]
    fn disabled_families_are_omitted() {
        let reports = vec![ProjectReport { slug: "web".into(), ..Default::default() }];
        let text = render_prometheus("acme", &reports);
        assert!(!text.contains("sentry_open_issues"));
        assert!(!text.contains("sentry_events_received_24h"));
    }
}
