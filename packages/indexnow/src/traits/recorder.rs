//! Outcome recorder trait.
//!
//! The pipeline writes one [`OutcomeRecord`] per unit of work. Sinks decide
//! where it goes (memory, text file, SQLite); the pipeline does not care.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::StoreResult;
use crate::types::record::OutcomeRecord;

/// Append-only sink for outcome records.
///
/// Implementations must tolerate concurrent calls: the publish path and the
/// sitemap path may record at the same time.
#[async_trait]
pub trait OutcomeRecorder: Send + Sync {
    async fn record(&self, entry: &OutcomeRecord) -> StoreResult<()>;
}

#[async_trait]
impl<T: OutcomeRecorder + ?Sized> OutcomeRecorder for Arc<T> {
    async fn record(&self, entry: &OutcomeRecord) -> StoreResult<()> {
        (**self).record(entry).await
    }
}
