//! Pipeline configuration.

use std::time::Duration;

use crate::types::endpoint::SiteEndpoint;

/// Default IndexNow endpoint.
pub const DEFAULT_ENDPOINT_URL: &str = "https://api.indexnow.org/indexnow";

/// IndexNow accepts at most this many URLs per request.
pub const MAX_URLS_PER_REQUEST: usize = 10_000;

/// Time budgets for network calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Per sitemap document
    pub sitemap_fetch: Duration,

    /// Single-URL submission from the publish path
    pub single_submit: Duration,

    /// Each batch of the sitemap path
    pub bulk_submit: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            sitemap_fetch: Duration::from_secs(15),
            single_submit: Duration::from_secs(10),
            bulk_submit: Duration::from_secs(30),
        }
    }
}

/// Limits for sitemap resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Deepest sitemap-index nesting followed (root is depth 0)
    pub max_depth: usize,

    /// Concurrent sitemap fetches
    pub concurrency: usize,

    /// Budget for each fetch
    pub fetch_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            concurrency: 4,
            fetch_timeout: Duration::from_secs(15),
        }
    }
}

/// Everything the pipeline needs to know about one site.
#[derive(Debug, Clone)]
pub struct IndexNowConfig {
    pub endpoint: SiteEndpoint,

    /// Sitemap used by scheduled runs and as the manual default
    pub sitemap_url: Option<String>,

    /// Write outcome records
    pub logging_enabled: bool,

    /// Minimum time between scheduled sitemap runs
    pub bulk_interval: Duration,

    pub timeouts: Timeouts,

    pub max_depth: usize,

    pub fetch_concurrency: usize,

    /// Batch size for the sitemap path
    pub max_urls_per_request: usize,
}

impl Default for IndexNowConfig {
    fn default() -> Self {
        Self {
            endpoint: SiteEndpoint::default(),
            sitemap_url: None,
            logging_enabled: true,
            bulk_interval: Duration::from_secs(86_400),
            timeouts: Timeouts::default(),
            max_depth: 10,
            fetch_concurrency: 4,
            max_urls_per_request: MAX_URLS_PER_REQUEST,
        }
    }
}

impl IndexNowConfig {
    pub fn new(endpoint: SiteEndpoint) -> Self {
        Self {
            endpoint,
            ..Default::default()
        }
    }

    /// Set the sitemap URL. Blank values clear it.
    pub fn with_sitemap_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into().trim().to_string();
        self.sitemap_url = (!url.is_empty()).then_some(url);
        self
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging_enabled = enabled;
        self
    }

    pub fn with_bulk_interval(mut self, interval: Duration) -> Self {
        self.bulk_interval = interval;
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_fetch_concurrency(mut self, concurrency: usize) -> Self {
        self.fetch_concurrency = concurrency.max(1);
        self
    }

    /// Set the batch size, capped at the IndexNow limit.
    pub fn with_max_urls_per_request(mut self, max: usize) -> Self {
        self.max_urls_per_request = max.clamp(1, MAX_URLS_PER_REQUEST);
        self
    }

    /// Resolver settings derived from this config.
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            max_depth: self.max_depth,
            concurrency: self.fetch_concurrency,
            fetch_timeout: self.timeouts.sitemap_fetch,
        }
    }
}
