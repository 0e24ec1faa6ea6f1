//! Server dependencies (using traits for testability)
//!
//! The pipeline is built once per invocation from [`Config`]. Every
//! collaborator sits behind `Arc<dyn ...>` so tests can inject mocks through
//! [`TestDependencies`](super::TestDependencies).

use anyhow::{Context, Result};
use std::sync::Arc;

use indexnow::stores::{FileGateStore, FileRecorder, SqliteStore};
use indexnow::{Fetcher, GateStore, HttpFetcher, IndexNow, IndexNowNotifier, Notifier, OutcomeRecorder};

use crate::config::{Config, LogBackend};

/// The pipeline as the server holds it.
pub type DynIndexNow = IndexNow<
    Arc<dyn Fetcher>,
    Arc<dyn Notifier>,
    Arc<dyn OutcomeRecorder>,
    Arc<dyn GateStore>,
>;

/// Shared state handed to routes and scheduled tasks.
#[derive(Clone)]
pub struct ServerDeps {
    pub indexnow: Arc<DynIndexNow>,
}

impl ServerDeps {
    pub fn new(indexnow: Arc<DynIndexNow>) -> Self {
        Self { indexnow }
    }

    pub async fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(build_indexnow(config).await?))
    }
}

/// Wire the real fetcher, notifier and the configured storage backend.
pub async fn build_indexnow(config: &Config) -> Result<Arc<DynIndexNow>> {
    let fetcher: Arc<dyn Fetcher> =
        Arc::new(HttpFetcher::new().context("Failed to build HTTP client")?);
    let notifier: Arc<dyn Notifier> =
        Arc::new(IndexNowNotifier::new().with_endpoint_url(config.endpoint_url.clone()));

    let (recorder, gate_store): (Arc<dyn OutcomeRecorder>, Arc<dyn GateStore>) =
        match config.log_backend {
            LogBackend::File => {
                let recorder: Arc<dyn OutcomeRecorder> = Arc::new(FileRecorder::new(&config.data_dir));
                let gate_store: Arc<dyn GateStore> =
                    Arc::new(FileGateStore::in_dir(&config.data_dir));
                (recorder, gate_store)
            }
            LogBackend::Sqlite => {
                tokio::fs::create_dir_all(&config.data_dir)
                    .await
                    .with_context(|| {
                        format!("Failed to create data directory {}", config.data_dir.display())
                    })?;
                let store = Arc::new(
                    SqliteStore::new(&config.database_url)
                        .await
                        .context("Failed to open SQLite store")?,
                );
                let recorder: Arc<dyn OutcomeRecorder> = store.clone();
                let gate_store: Arc<dyn GateStore> = store;
                (recorder, gate_store)
            }
        };

    tracing::info!(
        host = %config.host,
        endpoint_url = %config.endpoint_url,
        backend = ?config.log_backend,
        sitemap_configured = config.sitemap_url.is_some(),
        "IndexNow pipeline configured"
    );

    Ok(Arc::new(IndexNow::new(
        config.indexnow_config(),
        fetcher,
        notifier,
        recorder,
        gate_store,
    )))
}
