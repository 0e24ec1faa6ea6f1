//! Time-gated re-run policy for the unattended sitemap path.
//!
//! ```text
//! tick ─► enter() ─► claim(now)? ─no─► release
//!                        │yes
//!                        ▼
//!                 run sitemap submit
//!                        │
//!                 mark_ran(now) ─► release
//! ```
//!
//! The guard returned by [`SubmissionGate::enter`] holds an async mutex, so
//! check, run and mark form one critical section within a process. The claim
//! writes the marker before the run through [`GateStore::claim`], which the
//! file and SQLite stores make atomic across processes sharing them.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error};

use crate::error::StoreResult;
use crate::traits::gate_store::GateStore;

/// Decides whether a scheduled sitemap run is due.
pub struct SubmissionGate<S: GateStore> {
    store: S,
    lock: Mutex<()>,
}

/// Exclusive access to the gate for one check-run-mark sequence.
pub struct GateGuard<'a, S: GateStore> {
    store: &'a S,
    _lock: MutexGuard<'a, ()>,
}

pub(crate) fn is_due(last_run: Option<i64>, now: i64, interval_secs: i64) -> bool {
    match last_run {
        None => true,
        Some(last) => now.saturating_sub(last) >= interval_secs,
    }
}

fn interval_secs(interval: Duration) -> i64 {
    i64::try_from(interval.as_secs()).unwrap_or(i64::MAX)
}

impl<S: GateStore> SubmissionGate<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Take exclusive access. Held until the guard is dropped.
    pub async fn enter(&self) -> GateGuard<'_, S> {
        GateGuard {
            store: &self.store,
            _lock: self.lock.lock().await,
        }
    }

    /// True when no run is recorded or `interval` has elapsed since it.
    pub async fn should_run(&self, now: DateTime<Utc>, interval: Duration) -> StoreResult<bool> {
        self.enter().await.should_run(now, interval).await
    }

    /// Record `now` as the last run.
    pub async fn mark_ran(&self, now: DateTime<Utc>) -> StoreResult<()> {
        self.enter().await.mark_ran(now).await
    }

    /// Run `work` if due, then mark the gate whatever `work` returned.
    ///
    /// Returns `None` when the run was not due. Only a failed claim is an
    /// error; a failed mark after the run is logged and the output returned.
    pub async fn run_if_due<F, Fut, T>(
        &self,
        now: DateTime<Utc>,
        interval: Duration,
        work: F,
    ) -> StoreResult<Option<T>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        let guard = self.enter().await;
        if !guard.claim(now, interval).await? {
            return Ok(None);
        }
        let output = work().await;
        if let Err(e) = guard.mark_ran(now).await {
            error!(error = %e, "Failed to persist gate state");
        }
        Ok(Some(output))
    }
}

impl<S: GateStore> GateGuard<'_, S> {
    pub async fn should_run(&self, now: DateTime<Utc>, interval: Duration) -> StoreResult<bool> {
        let last_run = self.store.load().await?;
        let due = is_due(last_run, now.timestamp(), interval_secs(interval));
        debug!(
            last_run = ?last_run,
            now = now.timestamp(),
            interval_secs = interval.as_secs(),
            due,
            "Gate checked"
        );
        Ok(due)
    }

    /// Check and record in one store operation. False when not due.
    pub async fn claim(&self, now: DateTime<Utc>, interval: Duration) -> StoreResult<bool> {
        let claimed = self
            .store
            .claim(now.timestamp(), interval_secs(interval))
            .await?;
        debug!(
            now = now.timestamp(),
            interval_secs = interval.as_secs(),
            claimed,
            "Gate claimed"
        );
        Ok(claimed)
    }

    pub async fn mark_ran(&self, now: DateTime<Utc>) -> StoreResult<()> {
        self.store.save(now.timestamp()).await
    }
}
