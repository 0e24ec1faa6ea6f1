//! Notifier implementations.
//!
//! - `IndexNowNotifier` - POSTs to an IndexNow endpoint
//! - `MockNotifier` (in [`testing`](crate::testing)) - For testing

mod indexnow;

pub use indexnow::{IndexNowNotifier, IndexNowPayload};

// Re-export from traits for convenience
pub use crate::traits::notifier::{preflight, Notifier};
