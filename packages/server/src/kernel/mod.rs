//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod scheduled_tasks;
pub mod test_dependencies;

pub use deps::{build_indexnow, DynIndexNow, ServerDeps};
pub use scheduled_tasks::{run_scheduled_tick, start_scheduler};
pub use test_dependencies::TestDependencies;
