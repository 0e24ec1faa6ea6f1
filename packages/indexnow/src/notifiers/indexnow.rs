//! IndexNow HTTP notifier.
//!
//! Wire format:
//!
//! ```text
//! POST https://api.indexnow.org/indexnow
//! Content-Type: application/json
//!
//! {"host": "...", "key": "...", "keyLocation": "...", "urlList": ["..."]}
//! ```

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::traits::notifier::{preflight, Notifier};
use crate::types::{
    config::DEFAULT_ENDPOINT_URL, endpoint::SiteEndpoint, submission::SubmissionResult,
    url_set::UrlSet,
};

/// Request body sent to the IndexNow endpoint.
#[derive(Debug, Serialize)]
pub struct IndexNowPayload<'a> {
    pub host: &'a str,
    pub key: &'a str,
    #[serde(rename = "keyLocation", skip_serializing_if = "Option::is_none")]
    pub key_location: Option<&'a str>,
    #[serde(rename = "urlList")]
    pub url_list: Vec<&'a str>,
}

impl<'a> IndexNowPayload<'a> {
    pub fn new(endpoint: &'a SiteEndpoint, urls: &'a UrlSet) -> Self {
        Self {
            host: &endpoint.host,
            key: endpoint.api_key.expose(),
            key_location: endpoint.key_location.as_deref().filter(|l| !l.is_empty()),
            url_list: urls.iter().collect(),
        }
    }
}

/// Submits URL lists to an IndexNow endpoint with reqwest.
pub struct IndexNowNotifier {
    client: reqwest::Client,
    endpoint_url: String,
}

impl Default for IndexNowNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexNowNotifier {
    /// Create a notifier for the public IndexNow endpoint.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
        }
    }

    /// Post to a different endpoint (another search engine, or a test server).
    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = url.into();
        self
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

#[async_trait]
impl Notifier for IndexNowNotifier {
    async fn submit(
        &self,
        endpoint: &SiteEndpoint,
        urls: &UrlSet,
        timeout: Duration,
    ) -> SubmissionResult {
        let count = urls.len();

        if let Err(e) = preflight(endpoint, urls) {
            warn!(host = %endpoint.host, error = %e, "Submission refused");
            return SubmissionResult::config_failure(e, count);
        }

        let payload = IndexNowPayload::new(endpoint, urls);
        debug!(
            endpoint = %self.endpoint_url,
            host = %endpoint.host,
            count,
            "Submitting URLs"
        );

        let response = self
            .client
            .post(&self.endpoint_url)
            .json(&payload)
            .timeout(timeout)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                warn!(endpoint = %self.endpoint_url, count, error = %e, "Submission transport error");
                return SubmissionResult::transport_failure(e.to_string(), count);
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(status, error = %e, "Failed to read submission response body");
                String::new()
            }
        };

        let result = SubmissionResult::from_response(status, body, count);
        if result.is_success() {
            info!(host = %endpoint.host, count, "Submission accepted");
        } else {
            warn!(
                host = %endpoint.host,
                count,
                status,
                body = %result.response_body,
                "Submission rejected"
            );
        }
        result
    }

    fn name(&self) -> &str {
        "indexnow"
    }
}
