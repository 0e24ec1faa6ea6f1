use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use super::IndexNow;
use crate::error::ConfigError;
use crate::traits::{
    fetcher::Fetcher, gate_store::GateStore, notifier::Notifier, recorder::OutcomeRecorder,
};
use crate::types::{
    event::RequestContext,
    record::{OutcomeRecord, RecordSubject},
    submission::SubmissionResult,
};

/// Recorded when resolution yields nothing to submit.
pub const NO_URLS_FOUND: &str = "no URLs found in sitemap";

/// How a sitemap run ended.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BulkOutcome {
    /// One result per batch, in submission order
    Submitted { results: Vec<SubmissionResult> },

    NoUrlsFound,

    /// Endpoint configuration refused before any fetch
    ConfigRejected { error: ConfigError },

    /// Neither an override nor a configured sitemap URL
    MissingSitemapUrl,
}

/// Result of one sitemap run.
#[derive(Debug, Clone, Serialize)]
pub struct BulkReport {
    pub sitemap_url: String,

    /// Distinct URLs found by resolution
    pub discovered: usize,

    pub outcome: BulkOutcome,
}

impl BulkReport {
    fn new(sitemap_url: impl Into<String>, discovered: usize, outcome: BulkOutcome) -> Self {
        Self {
            sitemap_url: sitemap_url.into(),
            discovered,
            outcome,
        }
    }

    /// True when every batch was accepted.
    pub fn is_success(&self) -> bool {
        match &self.outcome {
            BulkOutcome::Submitted { results } => results.iter().all(SubmissionResult::is_success),
            _ => false,
        }
    }

    pub fn results(&self) -> &[SubmissionResult] {
        match &self.outcome {
            BulkOutcome::Submitted { results } => results,
            _ => &[],
        }
    }

    /// URLs included across all batches.
    pub fn submitted_count(&self) -> usize {
        self.results().iter().map(|r| r.submitted_count).sum()
    }

    /// Human-readable summary for operators.
    pub fn message(&self) -> String {
        match &self.outcome {
            BulkOutcome::Submitted { results } if results.len() == 1 => results[0].message(),
            BulkOutcome::Submitted { results } => {
                let accepted = results.iter().filter(|r| r.is_success()).count();
                format!(
                    "{} of {} batches accepted ({} URLs)",
                    accepted,
                    results.len(),
                    self.submitted_count()
                )
            }
            BulkOutcome::NoUrlsFound => NO_URLS_FOUND.to_string(),
            BulkOutcome::ConfigRejected { error } => format!("configuration error: {}", error),
            BulkOutcome::MissingSitemapUrl => {
                format!("configuration error: {}", ConfigError::MissingSitemapUrl)
            }
        }
    }
}

/// What a periodic trigger did.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScheduledOutcome {
    /// No sitemap URL configured; gate untouched
    NotConfigured,

    /// Interval has not elapsed since the last run
    NotDue,

    /// Gate state could not be read; run skipped
    GateUnavailable { error: String },

    Ran { report: BulkReport },
}

impl<F, N, R, G> IndexNow<F, N, R, G>
where
    F: Fetcher,
    N: Notifier,
    R: OutcomeRecorder,
    G: GateStore,
{
    /// Resolve a sitemap and submit everything it lists.
    ///
    /// Bypasses the gate. Each batch of at most `max_urls_per_request` URLs is
    /// one notifier call and one recorder entry.
    pub async fn run_sitemap_submit(&self, sitemap_url: &str, ctx: &RequestContext) -> BulkReport {
        let sitemap_url = sitemap_url.trim();
        if sitemap_url.is_empty() {
            return BulkReport::new("", 0, BulkOutcome::MissingSitemapUrl);
        }

        if let Err(e) = self.config.endpoint.validate() {
            warn!(sitemap_url = %sitemap_url, error = %e, "Sitemap submission refused");
            let result = SubmissionResult::config_failure(e.clone(), 0);
            self.record(OutcomeRecord::from_submission(RecordSubject::Bulk, &result, ctx))
                .await;
            return BulkReport::new(sitemap_url, 0, BulkOutcome::ConfigRejected { error: e });
        }

        let urls = self.resolver.resolve(sitemap_url).await;
        if urls.is_empty() {
            info!(sitemap_url = %sitemap_url, "Sitemap yielded no URLs");
            self.record(
                OutcomeRecord::new(RecordSubject::Bulk, NO_URLS_FOUND, ctx).with_submitted_count(0),
            )
            .await;
            return BulkReport::new(sitemap_url, 0, BulkOutcome::NoUrlsFound);
        }

        let batches = urls.chunks(self.config.max_urls_per_request);
        let batch_count = batches.len();
        let mut results = Vec::with_capacity(batch_count);

        for (index, batch) in batches.iter().enumerate() {
            let result = self
                .notifier
                .submit(&self.config.endpoint, batch, self.config.timeouts.bulk_submit)
                .await;

            info!(
                sitemap_url = %sitemap_url,
                batch = index + 1,
                batches = batch_count,
                count = batch.len(),
                http_status = result.status_code(),
                success = result.is_success(),
                "Sitemap batch submitted"
            );

            self.record(OutcomeRecord::from_submission(RecordSubject::Bulk, &result, ctx))
                .await;
            results.push(result);
        }

        BulkReport::new(sitemap_url, urls.len(), BulkOutcome::Submitted { results })
    }

    /// Operator-triggered run. Uses `sitemap_override` when non-blank,
    /// otherwise the configured sitemap.
    pub async fn handle_manual_submit(
        &self,
        sitemap_override: Option<&str>,
        ctx: &RequestContext,
    ) -> BulkReport {
        let sitemap_url = sitemap_override
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .or(self.config.sitemap_url.as_deref());

        match sitemap_url {
            Some(url) => self.run_sitemap_submit(url, ctx).await,
            None => {
                warn!("Manual sitemap submission without a sitemap URL");
                BulkReport::new("", 0, BulkOutcome::MissingSitemapUrl)
            }
        }
    }

    /// Periodic trigger. Runs the configured sitemap if the gate says it is due.
    ///
    /// The gate is marked with `now` after every run, whatever the outcome.
    pub async fn run_scheduled(&self, now: DateTime<Utc>) -> ScheduledOutcome {
        let Some(sitemap_url) = self.config.sitemap_url.as_deref() else {
            return ScheduledOutcome::NotConfigured;
        };

        let ctx = RequestContext::system();
        let run = self
            .gate
            .run_if_due(now, self.config.bulk_interval, || {
                self.run_sitemap_submit(sitemap_url, &ctx)
            })
            .await;

        match run {
            Ok(Some(report)) => ScheduledOutcome::Ran { report },
            Ok(None) => ScheduledOutcome::NotDue,
            Err(e) => {
                error!(error = %e, "Failed to read gate state, skipping scheduled run");
                ScheduledOutcome::GateUnavailable {
                    error: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::MockFetcher;
    use crate::stores::{MemoryGateStore, MemoryRecorder};
    use crate::testing::{sitemap_index, urlset, MockNotifier};
    use crate::types::{config::IndexNowConfig, endpoint::SiteEndpoint};
    use chrono::{Duration as ChronoDuration, TimeZone};

    const ROOT: &str = "https://example.com/sitemap.xml";

    struct Harness {
        pipeline: IndexNow<MockFetcher, MockNotifier, MemoryRecorder, MemoryGateStore>,
        notifier: MockNotifier,
        recorder: MemoryRecorder,
        gate: MemoryGateStore,
    }

    fn harness(config: IndexNowConfig, fetcher: MockFetcher) -> Harness {
        let notifier = MockNotifier::new();
        let recorder = MemoryRecorder::new();
        let gate = MemoryGateStore::new();
        Harness {
            pipeline: IndexNow::new(config, fetcher, notifier.clone(), recorder.clone(), gate.clone()),
            notifier,
            recorder,
            gate,
        }
    }

    fn configured() -> IndexNowConfig {
        IndexNowConfig::new(SiteEndpoint::new("example.com", "abc123")).with_sitemap_url(ROOT)
    }

    fn three_urls() -> MockFetcher {
        MockFetcher::new().with_document(
            ROOT,
            urlset(&[
                "https://example.com/a",
                "https://example.com/b",
                "https://example.com/c",
            ]),
        )
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_sitemap_submit_records_count() {
        let h = harness(configured(), three_urls());

        let report = h.pipeline.run_sitemap_submit(ROOT, &RequestContext::new(2, "10.0.0.1")).await;

        assert!(report.is_success());
        assert_eq!(report.discovered, 3);
        assert_eq!(report.submitted_count(), 3);
        assert_eq!(h.notifier.call_count(), 1);

        let record = h.recorder.last().unwrap();
        assert!(record.is_bulk());
        assert_eq!(record.submitted_count, Some(3));
        assert_eq!(record.user_ip, "10.0.0.1");
    }

    #[tokio::test]
    async fn test_empty_resolution_skips_notifier() {
        let h = harness(configured(), MockFetcher::new());

        let report = h.pipeline.run_sitemap_submit(ROOT, &RequestContext::system()).await;

        assert!(matches!(report.outcome, BulkOutcome::NoUrlsFound));
        assert_eq!(report.message(), NO_URLS_FOUND);
        assert_eq!(h.notifier.call_count(), 0);
        assert_eq!(h.recorder.last().unwrap().message, NO_URLS_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_endpoint_skips_fetch() {
        let fetcher = three_urls();
        let h = harness(
            IndexNowConfig::new(SiteEndpoint::new("", "abc123")).with_sitemap_url(ROOT),
            fetcher.clone(),
        );

        let report = h.pipeline.run_sitemap_submit(ROOT, &RequestContext::system()).await;

        assert!(matches!(
            report.outcome,
            BulkOutcome::ConfigRejected { error: ConfigError::MissingHost }
        ));
        assert_eq!(fetcher.call_count(), 0);
        assert_eq!(h.notifier.call_count(), 0);
        assert_eq!(h.recorder.last().unwrap().message, "configuration error: missing host");
    }

    #[tokio::test]
    async fn test_batches_split_at_limit() {
        let urls: Vec<String> = (0..5).map(|i| format!("https://example.com/p/{}", i)).collect();
        let refs: Vec<&str> = urls.iter().map(String::as_str).collect();
        let fetcher = MockFetcher::new().with_document(ROOT, urlset(&refs));
        let h = harness(configured().with_max_urls_per_request(2), fetcher);

        let report = h.pipeline.run_sitemap_submit(ROOT, &RequestContext::system()).await;

        assert_eq!(report.results().len(), 3);
        assert_eq!(report.submitted_count(), 5);
        assert_eq!(report.message(), "3 of 3 batches accepted (5 URLs)");

        let sizes: Vec<usize> = h.notifier.calls().iter().map(|c| c.urls.len()).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
        assert_eq!(h.recorder.len(), 3);
    }

    #[tokio::test]
    async fn test_rejection_is_reported() {
        let h = harness(configured(), three_urls());
        h.notifier.respond_with(403, "key not valid");

        let report = h.pipeline.run_sitemap_submit(ROOT, &RequestContext::system()).await;

        assert!(!report.is_success());
        assert_eq!(report.message(), "HTTP 403 - key not valid");
        assert_eq!(h.recorder.last().unwrap().http_status, 403);
    }

    #[tokio::test]
    async fn test_manual_submit_prefers_override() {
        let other = "https://example.com/other.xml";
        let fetcher = three_urls().with_document(other, urlset(&["https://example.com/z"]));
        let h = harness(configured(), fetcher);

        let report = h
            .pipeline
            .handle_manual_submit(Some(other), &RequestContext::default())
            .await;
        assert_eq!(report.sitemap_url, other);
        assert_eq!(report.discovered, 1);

        let report = h
            .pipeline
            .handle_manual_submit(Some("  "), &RequestContext::default())
            .await;
        assert_eq!(report.sitemap_url, ROOT);
        assert_eq!(report.discovered, 3);
    }

    #[tokio::test]
    async fn test_manual_submit_without_any_url() {
        let h = harness(
            IndexNowConfig::new(SiteEndpoint::new("example.com", "abc123")),
            three_urls(),
        );

        let report = h.pipeline.handle_manual_submit(None, &RequestContext::default()).await;

        assert!(matches!(report.outcome, BulkOutcome::MissingSitemapUrl));
        assert_eq!(report.message(), "configuration error: sitemap URL is empty");
        assert!(h.recorder.is_empty());
    }

    #[tokio::test]
    async fn test_manual_submit_bypasses_gate() {
        let h = harness(configured(), three_urls());
        h.pipeline.gate().mark_ran(noon()).await.unwrap();

        let report = h.pipeline.handle_manual_submit(None, &RequestContext::default()).await;
        assert!(report.is_success());
        assert_eq!(h.gate.last_run(), Some(noon().timestamp()));
    }

    #[tokio::test]
    async fn test_scheduled_without_sitemap_leaves_gate() {
        let h = harness(
            IndexNowConfig::new(SiteEndpoint::new("example.com", "abc123")),
            three_urls(),
        );

        let outcome = h.pipeline.run_scheduled(noon()).await;

        assert!(matches!(outcome, ScheduledOutcome::NotConfigured));
        assert_eq!(h.gate.last_run(), None);
    }

    #[tokio::test]
    async fn test_scheduled_runs_once_per_interval() {
        let h = harness(configured(), three_urls());

        let first = h.pipeline.run_scheduled(noon()).await;
        assert!(matches!(first, ScheduledOutcome::Ran { .. }));
        assert_eq!(h.gate.last_run(), Some(noon().timestamp()));

        let later = noon() + ChronoDuration::hours(1);
        assert!(matches!(h.pipeline.run_scheduled(later).await, ScheduledOutcome::NotDue));

        let next_day = noon() + ChronoDuration::days(1);
        assert!(matches!(
            h.pipeline.run_scheduled(next_day).await,
            ScheduledOutcome::Ran { .. }
        ));
        assert_eq!(h.notifier.call_count(), 2);
    }

    #[tokio::test]
    async fn test_scheduled_marks_gate_on_failure() {
        let h = harness(configured(), MockFetcher::new());

        let outcome = h.pipeline.run_scheduled(noon()).await;

        match outcome {
            ScheduledOutcome::Ran { report } => {
                assert!(matches!(report.outcome, BulkOutcome::NoUrlsFound))
            }
            other => panic!("expected a run, got {:?}", other),
        }
        assert_eq!(h.gate.last_run(), Some(noon().timestamp()));
    }

    #[tokio::test]
    async fn test_scheduled_skips_when_gate_unreadable() {
        let h = harness(configured(), three_urls());
        h.gate.fail_next_load();

        let outcome = h.pipeline.run_scheduled(noon()).await;

        assert!(matches!(outcome, ScheduledOutcome::GateUnavailable { .. }));
        assert_eq!(h.notifier.call_count(), 0);
        assert_eq!(h.gate.last_run(), None);
    }

    #[tokio::test]
    async fn test_index_children_are_merged() {
        let child_a = "https://example.com/sitemap-a.xml";
        let child_b = "https://example.com/sitemap-b.xml";
        let fetcher = MockFetcher::new()
            .with_document(ROOT, sitemap_index(&[child_a, child_b]))
            .with_document(child_a, urlset(&["https://example.com/1", "https://example.com/2"]))
            .with_document(child_b, urlset(&["https://example.com/2", "https://example.com/3"]));
        let h = harness(configured(), fetcher);

        let report = h.pipeline.run_sitemap_submit(ROOT, &RequestContext::system()).await;

        assert_eq!(report.discovered, 3);
        assert_eq!(
            h.notifier.calls()[0].urls,
            vec![
                "https://example.com/1".to_string(),
                "https://example.com/2".to_string(),
                "https://example.com/3".to_string(),
            ]
        );
    }

    #[test]
    fn test_report_serializes_status() {
        let report = BulkReport::new(ROOT, 0, BulkOutcome::NoUrlsFound);
        let json = serde_json::to_value(ScheduledOutcome::Ran { report }).unwrap();
        assert_eq!(json["status"], "ran");
        assert_eq!(json["report"]["outcome"]["status"], "no_urls_found");
    }
}
