//! Persistence for the submission gate's last-run marker.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::StoreResult;
use crate::gate::is_due;

/// Stores a single `last_run` value in epoch seconds.
///
/// Only [`SubmissionGate`](crate::gate::SubmissionGate) should call this. The
/// gate serializes callers inside one process; stores shared between
/// processes make [`claim`](GateStore::claim) atomic on their own.
#[async_trait]
pub trait GateStore: Send + Sync {
    /// The last recorded run, `None` before the first one.
    async fn load(&self) -> StoreResult<Option<i64>>;

    /// Overwrite the last recorded run.
    async fn save(&self, epoch_seconds: i64) -> StoreResult<()>;

    /// Record `now` if no run is stored or `interval_secs` have passed since
    /// it. Returns true when this caller took the interval.
    ///
    /// The default is a plain load then save, atomic only under the gate's
    /// in-process lock.
    async fn claim(&self, now: i64, interval_secs: i64) -> StoreResult<bool> {
        let due = is_due(self.load().await?, now, interval_secs);
        if due {
            self.save(now).await?;
        }
        Ok(due)
    }
}

#[async_trait]
impl<T: GateStore + ?Sized> GateStore for Arc<T> {
    async fn load(&self) -> StoreResult<Option<i64>> {
        (**self).load().await
    }

    async fn save(&self, epoch_seconds: i64) -> StoreResult<()> {
        (**self).save(epoch_seconds).await
    }

    async fn claim(&self, now: i64, interval_secs: i64) -> StoreResult<bool> {
        (**self).claim(now, interval_secs).await
    }
}
