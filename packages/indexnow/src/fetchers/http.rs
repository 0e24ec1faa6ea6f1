//! HTTP-based fetcher implementation.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::Fetcher;

/// Redirect hops followed before giving up.
const MAX_REDIRECTS: usize = 10;

/// Fetches documents over HTTP(S) with reqwest.
///
/// # Example
///
/// ```rust,ignore
/// use indexnow::fetchers::HttpFetcher;
///
/// let fetcher = HttpFetcher::new()?.with_user_agent("MyBot/1.0");
/// ```
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher with default settings.
    pub fn new() -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            user_agent: format!("indexnow-sitemap/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn map_error(url: &str, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult<Vec<u8>> {
        let parsed = url::Url::parse(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
            });
        }

        debug!(url = %url, timeout_secs = timeout.as_secs(), "HTTP fetch starting");

        // The timeout covers connect, redirects and body download
        let response = self
            .client
            .get(parsed)
            .header("User-Agent", &self.user_agent)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "HTTP request failed");
                Self::map_error(url, e)
            })?;

        let status = response.status();
        let final_url = response.url().to_string();

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::map_error(url, e))?;

        if body.is_empty() {
            return Err(FetchError::Empty {
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            warn!(
                url = %url,
                status = status.as_u16(),
                "Non-success status, returning body anyway"
            );
        }

        debug!(
            url = %url,
            final_url = %final_url,
            status = status.as_u16(),
            bytes = body.len(),
            "HTTP fetch completed"
        );

        Ok(body.to_vec())
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<urlset/>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let body = fetcher
            .fetch(&format!("{}/sitemap.xml", server.uri()), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(body, b"<urlset/>");
    }

    #[tokio::test]
    async fn test_fetch_follows_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old.xml"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("Location", format!("{}/new.xml", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<urlset/>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let body = fetcher
            .fetch(&format!("{}/old.xml", server.uri()), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(body, b"<urlset/>");
    }

    #[tokio::test]
    async fn test_non_success_with_body_is_returned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let body = fetcher
            .fetch(&format!("{}/missing.xml", server.uri()), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(body, b"not here");
    }

    #[tokio::test]
    async fn test_empty_body_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let result = fetcher
            .fetch(&format!("{}/empty.xml", server.uri()), Duration::from_secs(5))
            .await;

        assert!(matches!(result, Err(FetchError::Empty { .. })));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<urlset/>")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let result = fetcher
            .fetch(&format!("{}/slow.xml", server.uri()), Duration::from_millis(200))
            .await;

        assert!(matches!(result, Err(FetchError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport() {
        let fetcher = HttpFetcher::new().unwrap();
        // Port 9 (discard) on localhost is not listening in test environments
        let result = fetcher
            .fetch("http://127.0.0.1:9/sitemap.xml", Duration::from_secs(2))
            .await;

        assert!(matches!(result, Err(FetchError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let fetcher = HttpFetcher::new().unwrap();
        let result = fetcher.fetch("ftp://example.com/x", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));

        let result = fetcher.fetch("not a url", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }
}
