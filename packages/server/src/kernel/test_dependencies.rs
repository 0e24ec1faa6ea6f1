// TestDependencies - mock implementations for testing
//
// Builds the server's pipeline type from the library's mocks, keeping
// handles so tests can inspect calls afterwards.

use std::sync::Arc;

use indexnow::stores::{MemoryGateStore, MemoryRecorder};
use indexnow::testing::{urlset, MockNotifier};
use indexnow::{
    Fetcher, GateStore, IndexNow, IndexNowConfig, MockFetcher, Notifier, OutcomeRecorder,
    SiteEndpoint,
};

use super::deps::{DynIndexNow, ServerDeps};

pub const TEST_SITEMAP_URL: &str = "https://example.com/sitemap.xml";

/// Mocks for every pipeline collaborator.
pub struct TestDependencies {
    pub config: IndexNowConfig,
    pub fetcher: MockFetcher,
    pub notifier: MockNotifier,
    pub recorder: MemoryRecorder,
    pub gate: MemoryGateStore,
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDependencies {
    /// A configured site whose sitemap lists two URLs.
    pub fn new() -> Self {
        Self {
            config: IndexNowConfig::new(SiteEndpoint::new("example.com", "abc123"))
                .with_sitemap_url(TEST_SITEMAP_URL),
            fetcher: MockFetcher::new().with_document(
                TEST_SITEMAP_URL,
                urlset(&["https://example.com/", "https://example.com/about"]),
            ),
            notifier: MockNotifier::new(),
            recorder: MemoryRecorder::new(),
            gate: MemoryGateStore::new(),
        }
    }

    pub fn with_config(mut self, config: IndexNowConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_fetcher(mut self, fetcher: MockFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Build a pipeline sharing state with the mocks held here.
    pub fn indexnow(&self) -> Arc<DynIndexNow> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(self.fetcher.clone());
        let notifier: Arc<dyn Notifier> = Arc::new(self.notifier.clone());
        let recorder: Arc<dyn OutcomeRecorder> = Arc::new(self.recorder.clone());
        let gate: Arc<dyn GateStore> = Arc::new(self.gate.clone());

        Arc::new(IndexNow::new(
            self.config.clone(),
            fetcher,
            notifier,
            recorder,
            gate,
        ))
    }

    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(self.indexnow())
    }
}
