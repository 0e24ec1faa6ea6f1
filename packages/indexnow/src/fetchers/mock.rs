//! Mock fetcher for testing.
//!
//! Serves canned documents keyed by URL and records every request.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::Fetcher;

#[derive(Debug, Clone)]
enum MockResponse {
    Body(Vec<u8>),
    Timeout,
    Transport(String),
    Empty,
}

/// Mock fetcher for testing.
///
/// Unknown URLs fail with a transport error, like an unreachable host.
///
/// # Example
///
/// ```rust
/// use indexnow::fetchers::MockFetcher;
///
/// let mock = MockFetcher::new()
///     .with_document("https://example.com/sitemap.xml", "<urlset></urlset>");
/// ```
#[derive(Default)]
pub struct MockFetcher {
    responses: Arc<RwLock<HashMap<String, MockResponse>>>,
    calls: Arc<RwLock<Vec<String>>>,
    in_flight: Arc<RwLock<(usize, usize)>>,
    delay: Option<Duration>,
}

impl MockFetcher {
    /// Create a new empty mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn add_document(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.responses
            .write()
            .unwrap()
            .insert(url.into(), MockResponse::Body(body.into()));
    }

    /// Serve `body` for `url` (builder pattern).
    pub fn with_document(self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.add_document(url, body);
        self
    }

    /// Fail `url` with a timeout.
    pub fn with_timeout(self, url: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(url.into(), MockResponse::Timeout);
        self
    }

    /// Fail `url` with a transport error.
    pub fn with_transport_error(self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(url.into(), MockResponse::Transport(message.into()));
        self
    }

    /// Answer `url` with an empty body.
    pub fn with_empty(self, url: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(url.into(), MockResponse::Empty);
        self
    }

    /// Sleep this long inside every fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// URLs requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Number of fetches made.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Number of times `url` was requested.
    pub fn calls_for(&self, url: &str) -> usize {
        self.calls.read().unwrap().iter().filter(|c| *c == url).count()
    }

    /// Highest number of fetches observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.in_flight.read().unwrap().1
    }

    /// Clear recorded calls.
    pub fn reset_calls(&self) {
        self.calls.write().unwrap().clear();
        *self.in_flight.write().unwrap() = (0, 0);
    }
}

impl Clone for MockFetcher {
    fn clone(&self) -> Self {
        Self {
            responses: Arc::clone(&self.responses),
            calls: Arc::clone(&self.calls),
            in_flight: Arc::clone(&self.in_flight),
            delay: self.delay,
        }
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> FetchResult<Vec<u8>> {
        self.calls.write().unwrap().push(url.to_string());

        {
            let mut in_flight = self.in_flight.write().unwrap();
            in_flight.0 += 1;
            in_flight.1 = in_flight.1.max(in_flight.0);
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.write().unwrap().0 -= 1;

        let response = self.responses.read().unwrap().get(url).cloned();
        match response {
            Some(MockResponse::Body(body)) => Ok(body),
            Some(MockResponse::Timeout) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
            Some(MockResponse::Transport(message)) => Err(FetchError::Transport {
                url: url.to_string(),
                message,
            }),
            Some(MockResponse::Empty) => Err(FetchError::Empty {
                url: url.to_string(),
            }),
            None => Err(FetchError::Transport {
                url: url.to_string(),
                message: "no route to host".to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
