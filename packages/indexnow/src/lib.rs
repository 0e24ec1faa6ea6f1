//! Sitemap Resolution and IndexNow Submission Library
//!
//! Announces a site's URLs to search engines through the IndexNow protocol.
//! Two paths feed one notifier:
//!
//! - **Reactive**: a published item is submitted on its own, immediately
//! - **Bulk**: a sitemap (possibly a tree of sitemap indexes) is resolved into
//!   a flat, deduplicated URL set and submitted in batches, either on demand
//!   or at most once per interval
//!
//! # Usage
//!
//! ```rust,ignore
//! use indexnow::{HttpFetcher, IndexNow, IndexNowConfig, IndexNowNotifier, RequestContext, SiteEndpoint};
//! use indexnow::stores::{FileGateStore, FileRecorder};
//!
//! let config = IndexNowConfig::new(SiteEndpoint::new("example.com", api_key))
//!     .with_sitemap_url("https://example.com/sitemap.xml");
//!
//! let indexnow = IndexNow::new(
//!     config,
//!     HttpFetcher::new()?,
//!     IndexNowNotifier::new(),
//!     FileRecorder::new("./data"),
//!     FileGateStore::in_dir("./data"),
//! );
//!
//! // Unattended: only runs when the interval has elapsed
//! indexnow.run_scheduled(chrono::Utc::now()).await;
//!
//! // Operator: always runs
//! let report = indexnow.handle_manual_submit(None, &RequestContext::default()).await;
//! println!("{}", report.message());
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Seams: Fetcher, Notifier, OutcomeRecorder, GateStore
//! - [`types`] - Endpoint, URL sets, events, results, records, config
//! - [`sitemap`] - Parser and recursive resolver
//! - [`gate`] - Once-per-interval policy
//! - [`pipeline`] - Publish, sitemap, manual and scheduled flows
//! - [`fetchers`] / [`notifiers`] / [`stores`] - Implementations
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod fetchers;
pub mod gate;
pub mod notifiers;
pub mod pipeline;
pub mod security;
pub mod sitemap;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{ConfigError, FetchError, FetchResult, ParseError, ParseResult, StoreError, StoreResult};
pub use fetchers::{HttpFetcher, MockFetcher};
pub use gate::{GateGuard, SubmissionGate};
pub use notifiers::{IndexNowNotifier, IndexNowPayload};
pub use pipeline::{BulkOutcome, BulkReport, IndexNow, PublishOutcome, ScheduledOutcome};
pub use security::SecretString;
pub use sitemap::{parse_sitemap, SitemapResolver, VisitedSet};
pub use traits::{
    fetcher::Fetcher,
    gate_store::GateStore,
    notifier::{preflight, Notifier},
    recorder::OutcomeRecorder,
};
pub use types::{
    config::{IndexNowConfig, ResolverConfig, Timeouts, DEFAULT_ENDPOINT_URL, MAX_URLS_PER_REQUEST},
    endpoint::SiteEndpoint,
    event::{PublishEvent, RequestContext, Visibility},
    record::{OutcomeRecord, RecordSubject},
    sitemap::SitemapNode,
    submission::{SubmissionOutcome, SubmissionResult},
    url_set::UrlSet,
};
