//! Subscriber setup.
//!
//! `RUST_LOG` wins when set. Otherwise `LOG_LEVEL` picks a global level; the
//! usual level spellings (`DEBUG`, `WARNING`, `CRITICAL`, ...) are accepted.

use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Map a `LOG_LEVEL` value to an `EnvFilter` directive.
pub fn level_directive(raw: Option<&str>) -> &'static str {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("warn") | Some("warning") => "warn",
        Some("error") | Some("critical") | Some("fatal") => "error",
        Some("off") => "off",
        _ => "info",
    }
}

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = std::env::var(LOG_LEVEL_ENV).ok();
        EnvFilter::new(level_directive(level.as_deref()))
    });
    fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_are_case_insensitive() {
        assert_eq!(level_directive(Some("DEBUG")), "debug");
        assert_eq!(level_directive(Some("Warning")), "warn");
        assert_eq!(level_directive(Some("CRITICAL")), "error");
        assert_eq!(level_directive(Some("nonsense")), "info");
        assert_eq!(level_directive(None), "info");
    }
}
