//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the IndexNow library
//! without making real network calls. See also
//! [`MockFetcher`](crate::fetchers::MockFetcher) and the memory stores.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::traits::notifier::{preflight, Notifier};
use crate::types::{endpoint::SiteEndpoint, submission::SubmissionResult, url_set::UrlSet};

/// Build a `<urlset>` document listing `locs`.
pub fn urlset(locs: &[&str]) -> String {
    let entries: String = locs
        .iter()
        .map(|l| format!("<url><loc>{}</loc></url>", l))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        entries
    )
}

/// Build a `<sitemapindex>` document pointing at `locs`.
pub fn sitemap_index(locs: &[&str]) -> String {
    let entries: String = locs
        .iter()
        .map(|l| format!("<sitemap><loc>{}</loc></sitemap>", l))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</sitemapindex>"#,
        entries
    )
}

#[derive(Debug, Clone)]
enum MockResponse {
    Status { code: u16, body: String },
    Transport(String),
}

/// Record of a submission that passed preflight.
#[derive(Debug, Clone)]
pub struct MockNotifierCall {
    pub host: String,
    pub urls: Vec<String>,
    pub timeout: Duration,
}

/// A mock notifier for testing.
///
/// Runs the same preflight checks as the real notifier and only records
/// calls that would have reached the network. Answers HTTP 200 with an
/// empty body unless told otherwise. Clones share state.
#[derive(Clone)]
pub struct MockNotifier {
    response: Arc<RwLock<MockResponse>>,
    calls: Arc<RwLock<Vec<MockNotifierCall>>>,
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            response: Arc::new(RwLock::new(MockResponse::Status {
                code: 200,
                body: String::new(),
            })),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Answer every later call with `code` and `body`.
    pub fn respond_with(&self, code: u16, body: impl Into<String>) {
        *self.response.write().unwrap() = MockResponse::Status {
            code,
            body: body.into(),
        };
    }

    pub fn with_response(self, code: u16, body: impl Into<String>) -> Self {
        self.respond_with(code, body);
        self
    }

    /// Fail every later call as if the connection dropped.
    pub fn with_transport_error(self, message: impl Into<String>) -> Self {
        *self.response.write().unwrap() = MockResponse::Transport(message.into());
        self
    }

    pub fn calls(&self) -> Vec<MockNotifierCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Every URL submitted so far, across calls.
    pub fn submitted_urls(&self) -> Vec<String> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .flat_map(|c| c.urls.iter().cloned())
            .collect()
    }

    pub fn reset_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn submit(
        &self,
        endpoint: &SiteEndpoint,
        urls: &UrlSet,
        timeout: Duration,
    ) -> SubmissionResult {
        if let Err(e) = preflight(endpoint, urls) {
            return SubmissionResult::config_failure(e, urls.len());
        }

        self.calls.write().unwrap().push(MockNotifierCall {
            host: endpoint.host.clone(),
            urls: urls.iter().map(str::to_string).collect(),
            timeout,
        });

        let response = self.response.read().unwrap().clone();
        match response {
            MockResponse::Status { code, body } => {
                SubmissionResult::from_response(code, body, urls.len())
            }
            MockResponse::Transport(message) => {
                SubmissionResult::transport_failure(message, urls.len())
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
