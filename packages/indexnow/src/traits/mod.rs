//! Trait seams between the pipeline and its collaborators.

pub mod fetcher;
pub mod gate_store;
pub mod notifier;
pub mod recorder;
