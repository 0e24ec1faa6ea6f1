//! Plain-text file sinks.
//!
//! Publish entries append to [`POST_LOG_FILE`], sitemap entries to
//! [`BULK_LOG_FILE`], both under one data directory. The gate marker is a
//! single file holding the epoch seconds of the last run.
//!
//! Several processes (the server and one-shot CLI runs) may share a data
//! directory, so every write takes an exclusive OS lock: appends lock the log
//! file itself, gate access locks a sibling `.lock` file.

use async_trait::async_trait;
use fs4::fs_std::FileExt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::StoreResult;
use crate::gate::is_due;
use crate::traits::gate_store::GateStore;
use crate::traits::recorder::OutcomeRecorder;
use crate::types::record::OutcomeRecord;

pub const POST_LOG_FILE: &str = "indexnow_log.txt";
pub const BULK_LOG_FILE: &str = "indexnow_sitemap_log.txt";
pub const GATE_FILE: &str = "indexnow_last_bulk_run";

/// Run blocking file work off the async runtime.
async fn blocking<T, F>(work: F) -> std::io::Result<T>
where
    F: FnOnce() -> std::io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(std::io::Error::other)?
}

/// Append `bytes` while holding an exclusive lock on the file.
fn append_locked(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    FileExt::lock_exclusive(&file)?;
    file.write_all(bytes)?;
    file.flush()
    // lock released when `file` closes
}

/// Appends formatted entries to the log files in a directory.
///
/// Writes are serialized through an async mutex within the process and an OS
/// lock across processes; each entry goes out as a single append.
pub struct FileRecorder {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileRecorder {
    /// The directory is created on first write if missing.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Which file an entry lands in.
    pub fn path_for(&self, entry: &OutcomeRecord) -> PathBuf {
        if entry.is_bulk() {
            self.dir.join(BULK_LOG_FILE)
        } else {
            self.dir.join(POST_LOG_FILE)
        }
    }
}

#[async_trait]
impl OutcomeRecorder for FileRecorder {
    async fn record(&self, entry: &OutcomeRecord) -> StoreResult<()> {
        let path = self.path_for(entry);
        let line = entry.to_log_entry();

        let _guard = self.write_lock.lock().await;
        fs::create_dir_all(&self.dir).await?;
        blocking(move || append_locked(&path, line.as_bytes())).await?;
        Ok(())
    }
}

/// Keeps the gate marker in a single file.
pub struct FileGateStore {
    path: PathBuf,
}

impl FileGateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store the marker as [`GATE_FILE`] inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(GATE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The sibling file locked around every marker access.
    pub fn lock_path(&self) -> PathBuf {
        let mut path = self.path.clone().into_os_string();
        path.push(".lock");
        PathBuf::from(path)
    }

    /// Wait for the exclusive lock. Released when the returned file drops.
    async fn lock(&self) -> StoreResult<File> {
        let path = self.lock_path();
        let file = blocking(move || {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(&path)?;
            FileExt::lock_exclusive(&file)?;
            Ok(file)
        })
        .await?;
        Ok(file)
    }

    async fn read_marker(&self) -> StoreResult<Option<i64>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match raw.trim().parse::<i64>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                warn!(path = %self.path.display(), "Unparseable gate marker, treating as absent");
                Ok(None)
            }
        }
    }

    async fn write_marker(&self, epoch_seconds: i64) -> StoreResult<()> {
        fs::write(&self.path, epoch_seconds.to_string()).await?;
        Ok(())
    }
}

#[async_trait]
impl GateStore for FileGateStore {
    async fn load(&self) -> StoreResult<Option<i64>> {
        let _lock = self.lock().await?;
        self.read_marker().await
    }

    async fn save(&self, epoch_seconds: i64) -> StoreResult<()> {
        let _lock = self.lock().await?;
        self.write_marker(epoch_seconds).await
    }

    async fn claim(&self, now: i64, interval_secs: i64) -> StoreResult<bool> {
        let _lock = self.lock().await?;
        let due = is_due(self.read_marker().await?, now, interval_secs);
        if due {
            self.write_marker(now).await?;
        }
        Ok(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::event::RequestContext;
    use crate::types::record::RecordSubject;
    use crate::types::submission::SubmissionResult;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_entries_go_to_the_right_file() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = FileRecorder::new(dir.path());
        let ctx = RequestContext::new(3, "198.51.100.4");

        let post = OutcomeRecord::from_submission(
            RecordSubject::Post(12),
            &SubmissionResult::from_response(200, "", 1),
            &ctx,
        );
        let bulk = OutcomeRecord::from_submission(
            RecordSubject::Bulk,
            &SubmissionResult::from_response(422, "bad", 9),
            &RequestContext::system(),
        );
        recorder.record(&post).await.unwrap();
        recorder.record(&bulk).await.unwrap();

        let posts = std::fs::read_to_string(dir.path().join(POST_LOG_FILE)).unwrap();
        let bulks = std::fs::read_to_string(dir.path().join(BULK_LOG_FILE)).unwrap();

        assert!(posts.contains("PostID: 12, User: 3, IP: 198.51.100.4, HTTP: 200\n"));
        assert!(!posts.contains("bulk"));
        assert!(bulks.contains("PostID: bulk, User: 0, IP: system, HTTP: 422, URLs: 9\n"));
        assert!(bulks.contains("Message: HTTP 422 - bad\n"));
        assert!(bulks.ends_with(&format!("{}\n", "-".repeat(80))));
    }

    #[tokio::test]
    async fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("logs").join("indexnow");
        let recorder = FileRecorder::new(&nested);

        let entry = OutcomeRecord::new(RecordSubject::Post(1), "x", &RequestContext::default());
        recorder.record(&entry).await.unwrap();

        assert!(nested.join(POST_LOG_FILE).exists());
    }

    #[tokio::test]
    async fn test_concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Arc::new(FileRecorder::new(dir.path()));

        let mut handles = Vec::new();
        for id in 0..20 {
            let recorder = Arc::clone(&recorder);
            handles.push(tokio::spawn(async move {
                let entry = OutcomeRecord::new(
                    RecordSubject::Post(id),
                    format!("message {}", id),
                    &RequestContext::default(),
                );
                recorder.record(&entry).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let contents = std::fs::read_to_string(dir.path().join(POST_LOG_FILE)).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 60);
        for chunk in lines.chunks(3) {
            assert!(chunk[0].contains("PostID: "));
            assert!(chunk[1].starts_with("Message: message "));
            assert_eq!(chunk[2], "-".repeat(80));
        }
    }

    #[tokio::test]
    async fn test_gate_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileGateStore::in_dir(dir.path());

        assert_eq!(store.load().await.unwrap(), None);
        store.save(1_700_000_000).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(1_700_000_000));
    }

    #[tokio::test]
    async fn test_gate_file_garbage_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileGateStore::in_dir(dir.path());
        std::fs::write(store.path(), "not a number").unwrap();

        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_claim_takes_interval_once_across_stores() {
        let dir = tempfile::tempdir().unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            // separate instances, as separate processes would hold
            let store = FileGateStore::in_dir(dir.path());
            handles.push(tokio::spawn(async move { store.claim(1_000, 86_400).await.unwrap() }));
        }
        let mut won = 0;
        for handle in handles {
            if handle.await.unwrap() {
                won += 1;
            }
        }

        assert_eq!(won, 1);
        let store = FileGateStore::in_dir(dir.path());
        assert_eq!(store.load().await.unwrap(), Some(1_000));
        assert!(store.lock_path().exists());
        assert!(!store.claim(1_000 + 86_399, 86_400).await.unwrap());
        assert!(store.claim(1_000 + 86_400, 86_400).await.unwrap());
    }

    #[tokio::test]
    async fn test_recorders_sharing_a_dir_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();

        let mut handles = Vec::new();
        for id in 0..10 {
            let recorder = FileRecorder::new(dir.path());
            handles.push(tokio::spawn(async move {
                let entry = OutcomeRecord::new(
                    RecordSubject::Bulk,
                    format!("run {}", id),
                    &RequestContext::system(),
                );
                recorder.record(&entry).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let contents = std::fs::read_to_string(dir.path().join(BULK_LOG_FILE)).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 30);
        for chunk in lines.chunks(3) {
            assert!(chunk[0].contains("PostID: bulk"));
            assert!(chunk[1].starts_with("Message: run "));
            assert_eq!(chunk[2], "-".repeat(80));
        }
    }
}
