//! Orchestration of the two submission paths.
//!
//! ```text
//! publish event ─► handle_publish ─► Notifier (one URL) ─► OutcomeRecorder
//!
//! tick ─► run_scheduled ─► SubmissionGate ─┐
//! operator ─► handle_manual_submit ────────┴► run_sitemap_submit
//!                                               │
//!                            SitemapResolver ◄──┤
//!                     Notifier (per batch) ◄────┤
//!                        OutcomeRecorder ◄──────┘
//! ```

mod bulk;
mod publish;

pub use bulk::{BulkOutcome, BulkReport, ScheduledOutcome, NO_URLS_FOUND};
pub use publish::PublishOutcome;

use tracing::warn;

use crate::gate::SubmissionGate;
use crate::sitemap::SitemapResolver;
use crate::traits::{
    fetcher::Fetcher, gate_store::GateStore, notifier::Notifier, recorder::OutcomeRecorder,
};
use crate::types::{config::IndexNowConfig, record::OutcomeRecord};

/// One site's IndexNow integration.
///
/// Generic over its collaborators so tests can swap in mocks; the server
/// uses `Arc<dyn ...>` for each.
pub struct IndexNow<F, N, R, G>
where
    F: Fetcher,
    N: Notifier,
    R: OutcomeRecorder,
    G: GateStore,
{
    config: IndexNowConfig,
    resolver: SitemapResolver<F>,
    notifier: N,
    recorder: R,
    gate: SubmissionGate<G>,
}

impl<F, N, R, G> IndexNow<F, N, R, G>
where
    F: Fetcher,
    N: Notifier,
    R: OutcomeRecorder,
    G: GateStore,
{
    pub fn new(config: IndexNowConfig, fetcher: F, notifier: N, recorder: R, gate_store: G) -> Self {
        let resolver = SitemapResolver::with_config(fetcher, config.resolver_config());
        Self {
            config,
            resolver,
            notifier,
            recorder,
            gate: SubmissionGate::new(gate_store),
        }
    }

    pub fn config(&self) -> &IndexNowConfig {
        &self.config
    }

    pub fn resolver(&self) -> &SitemapResolver<F> {
        &self.resolver
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn gate(&self) -> &SubmissionGate<G> {
        &self.gate
    }

    /// Write an outcome entry if logging is on. Failures are logged only.
    async fn record(&self, entry: OutcomeRecord) {
        if !self.config.logging_enabled {
            return;
        }
        if let Err(e) = self.recorder.record(&entry).await {
            warn!(
                subject = %entry.subject,
                http_status = entry.http_status,
                error = %e,
                "Failed to write outcome record"
            );
        }
    }
}
