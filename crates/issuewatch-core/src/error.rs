//! Shared error type across issuewatch crates.

use thiserror::Error;

/// Stable error categories, used as log fields and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or invalid startup configuration.
    Config,
    /// Upstream API unreachable, TLS failure or non-2xx status.
    Upstream,
    /// Upstream payload could not be decoded.
    Decode,
    /// Snapshot store backing resource failed.
    Io,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Config => "CONFIG",
            ErrorKind::Upstream => "UPSTREAM",
            ErrorKind::Decode => "DECODE",
            ErrorKind::Io => "IO",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Boxed cause carried by upstream/decode errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Shared result type.
pub type Result<T> = std::result::Result<T, IssueWatchError>;

/// Unified error type used by core and exporter.
///
/// Variants that wrap a lower-level failure keep it as `source()`, so the
/// whole cause chain is available to whoever logs the error.
#[derive(Debug, Error)]
pub enum IssueWatchError {
    #[error("config: {0}")]
    Config(String),
    #[error("upstream: {msg}")]
    Upstream {
        msg: String,
        #[source]
        source: Option<BoxError>,
    },
    #[error("decode: {msg}")]
    Decode {
        msg: String,
        #[source]
        source: Option<BoxError>,
    },
    #[error("io: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("internal: {0}")]
    Internal(String),
}

impl IssueWatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IssueWatchError::Config(_) => ErrorKind::Config,
            IssueWatchError::Upstream { .. } => ErrorKind::Upstream,
            IssueWatchError::Decode { .. } => ErrorKind::Decode,
            IssueWatchError::Io { .. } => ErrorKind::Io,
            IssueWatchError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Upstream failure without an underlying cause (e.g. a non-2xx status).
    pub fn upstream(msg: impl Into<String>) -> Self {
        IssueWatchError::Upstream { msg: msg.into(), source: None }
    }

    pub fn upstream_with(msg: impl Into<String>, source: impl Into<BoxError>) -> Self {
        IssueWatchError::Upstream { msg: msg.into(), source: Some(source.into()) }
    }

    pub fn decode(msg: impl Into<String>, source: impl Into<BoxError>) -> Self {
        IssueWatchError::Decode { msg: msg.into(), source: Some(source.into()) }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        IssueWatchError::Io { context: context.into(), source }
    }
}

impl From<std::io::Error> for IssueWatchError {
    fn from(e: std::io::Error) -> Self {
        IssueWatchError::io("i/o failure", e)
    }
}
