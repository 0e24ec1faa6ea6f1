//! Fetcher trait for retrieving remote documents.
//!
//! A fetcher returns raw bytes and nothing else: no parsing, no retries.
//! Retry policy, if any, belongs to the caller.
//!
//! # Usage
//!
//! ```rust,ignore
//! use indexnow::traits::fetcher::Fetcher;
//!
//! let bytes = fetcher.fetch("https://example.com/sitemap.xml", Duration::from_secs(15)).await?;
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::FetchResult;

/// Retrieves the body of a URL within a time budget.
///
/// Implementations:
/// - `HttpFetcher` - reqwest, follows redirects
/// - `MockFetcher` - canned documents for tests
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url`, failing with `FetchError::Timeout` after `timeout`.
    ///
    /// Non-2xx responses still return their body when it is non-empty;
    /// an empty body is `FetchError::Empty`.
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult<Vec<u8>>;

    /// Get the fetcher name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult<Vec<u8>> {
        (**self).fetch(url, timeout).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
