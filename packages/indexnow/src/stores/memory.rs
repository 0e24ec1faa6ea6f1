//! In-memory recorder and gate store for testing and development.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::{StoreError, StoreResult};
use crate::traits::gate_store::GateStore;
use crate::traits::recorder::OutcomeRecorder;
use crate::types::record::OutcomeRecord;

fn injected_failure(what: &str) -> StoreError {
    StoreError::Backend(format!("injected {} failure", what).into())
}

/// Keeps every record in a vector.
///
/// Clones share the same storage, so a test can hand one clone to the
/// pipeline and inspect the other.
#[derive(Clone, Default)]
pub struct MemoryRecorder {
    records: Arc<RwLock<Vec<OutcomeRecord>>>,
    fail: Arc<AtomicBool>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `record` call fail.
    pub fn failing(self) -> Self {
        self.fail.store(true, Ordering::SeqCst);
        self
    }

    pub fn records(&self) -> Vec<OutcomeRecord> {
        self.records.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last(&self) -> Option<OutcomeRecord> {
        self.records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    pub fn clear(&self) {
        self.records.write().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

#[async_trait]
impl OutcomeRecorder for MemoryRecorder {
    async fn record(&self, entry: &OutcomeRecord) -> StoreResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(injected_failure("record"));
        }
        self.records
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry.clone());
        Ok(())
    }
}

/// Holds the last-run marker in memory.
#[derive(Clone, Default)]
pub struct MemoryGateStore {
    last_run: Arc<RwLock<Option<i64>>>,
    fail_load: Arc<AtomicBool>,
}

impl MemoryGateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a marker already set.
    pub fn with_last_run(self, epoch_seconds: i64) -> Self {
        *self.last_run.write().unwrap_or_else(|e| e.into_inner()) = Some(epoch_seconds);
        self
    }

    /// Make the next `load` fail once.
    pub fn fail_next_load(&self) {
        self.fail_load.store(true, Ordering::SeqCst);
    }

    pub fn last_run(&self) -> Option<i64> {
        *self.last_run.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl GateStore for MemoryGateStore {
    async fn load(&self) -> StoreResult<Option<i64>> {
        if self.fail_load.swap(false, Ordering::SeqCst) {
            return Err(injected_failure("load"));
        }
        Ok(self.last_run())
    }

    async fn save(&self, epoch_seconds: i64) -> StoreResult<()> {
        *self.last_run.write().unwrap_or_else(|e| e.into_inner()) = Some(epoch_seconds);
        Ok(())
    }
}
