//! Notifier trait for announcing URLs to an IndexNow endpoint.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ConfigError;
use crate::types::{endpoint::SiteEndpoint, submission::SubmissionResult, url_set::UrlSet};

/// Submits a URL list for a site.
///
/// `submit` never returns an error: every failure mode is described by the
/// returned [`SubmissionResult`] so callers can record it verbatim. There is
/// no retry; one call is at most one HTTP request.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn submit(
        &self,
        endpoint: &SiteEndpoint,
        urls: &UrlSet,
        timeout: Duration,
    ) -> SubmissionResult;

    /// Get the notifier name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    async fn submit(
        &self,
        endpoint: &SiteEndpoint,
        urls: &UrlSet,
        timeout: Duration,
    ) -> SubmissionResult {
        (**self).submit(endpoint, urls, timeout).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Checks every notifier performs before touching the network.
pub fn preflight(endpoint: &SiteEndpoint, urls: &UrlSet) -> Result<(), ConfigError> {
    endpoint.validate()?;
    if urls.is_empty() {
        return Err(ConfigError::EmptyUrlList);
    }
    Ok(())
}
