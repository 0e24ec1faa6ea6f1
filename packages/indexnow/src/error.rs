//! Typed errors for the IndexNow library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can match on
//! the failure class: configuration problems are never retried, fetch and
//! parse failures are absorbed during resolution, store failures are logged.

use serde::Serialize;
use thiserror::Error;

/// Configuration or input problems detected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ConfigError {
    /// No host configured
    #[error("missing host")]
    MissingHost,

    /// Host contains a scheme or path
    #[error("host must be a bare hostname without scheme or path: {0}")]
    InvalidHost(String),

    /// No API key configured
    #[error("missing API key")]
    MissingApiKey,

    /// Key location is not an absolute http(s) URL
    #[error("key location is not an absolute URL: {0}")]
    InvalidKeyLocation(String),

    /// Publish event carried no permalink
    #[error("missing URL for published item")]
    MissingPermalink,

    /// No sitemap URL configured or supplied
    #[error("sitemap URL is empty")]
    MissingSitemapUrl,

    /// Nothing to submit
    #[error("URL list is empty")]
    EmptyUrlList,
}

/// Errors that can occur while fetching remote content.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No response within the time budget
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// DNS, connection, TLS or protocol failure
    #[error("transport error fetching {url}: {message}")]
    Transport { url: String, message: String },

    /// The response carried no body
    #[error("empty response from: {url}")]
    Empty { url: String },

    /// URL could not be parsed or is not http(s)
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

impl FetchError {
    /// The URL the failed fetch was for.
    pub fn url(&self) -> &str {
        match self {
            FetchError::Timeout { url }
            | FetchError::Transport { url, .. }
            | FetchError::Empty { url }
            | FetchError::InvalidUrl { url } => url,
        }
    }
}

/// Errors raised while parsing a sitemap document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The XML reader rejected the document
    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    /// Document ended with elements still open
    #[error("document truncated inside <{element}>")]
    Truncated { element: String },

    /// Document has no root element at all
    #[error("document has no root element")]
    NoRoot,
}

/// Errors from outcome recorders and gate stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend (database) failure
    #[error("storage error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for sitemap parsing.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
