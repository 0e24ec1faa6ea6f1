//! Outcome recorders and gate stores.
//!
//! Available backends:
//! - `MemoryRecorder` / `MemoryGateStore` - In-memory (always available)
//! - `FileRecorder` / `FileGateStore` - Plain-text files in a data directory
//! - `SqliteStore` - SQLite, implements both traits (requires `sqlite` feature)

pub mod file;
pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{FileGateStore, FileRecorder, BULK_LOG_FILE, GATE_FILE, POST_LOG_FILE};
pub use memory::{MemoryGateStore, MemoryRecorder};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
