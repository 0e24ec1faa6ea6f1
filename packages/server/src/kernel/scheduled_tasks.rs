//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! One periodic task: the sitemap tick. The schedule only decides how often
//! the gate is consulted; the gate decides whether a run is due.
//!
//! ```text
//! Scheduler (INDEXNOW_TICK_SCHEDULE)
//!     │
//!     └─► run_scheduled(now)
//!             ├─► not configured / not due → return
//!             └─► resolve sitemap → submit batches → record → mark gate
//! ```

use anyhow::{Context, Result};
use chrono::Utc;
use indexnow::{BulkOutcome, ScheduledOutcome};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use super::deps::DynIndexNow;

/// Start all scheduled tasks
pub async fn start_scheduler(indexnow: Arc<DynIndexNow>, schedule: &str) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new()
        .await
        .context("Failed to create job scheduler")?;

    let tick_indexnow = indexnow.clone();
    let tick_job = Job::new_async(schedule, move |_uuid, _lock| {
        let indexnow = tick_indexnow.clone();
        Box::pin(async move {
            run_scheduled_tick(&indexnow).await;
        })
    })
    .with_context(|| format!("Invalid tick schedule '{}'", schedule))?;

    scheduler.add(tick_job).await?;
    scheduler.start().await?;

    tracing::info!(schedule = %schedule, "Scheduled tasks started (sitemap tick)");
    Ok(scheduler)
}

/// Run one gate-checked sitemap tick and log what happened.
pub async fn run_scheduled_tick(indexnow: &DynIndexNow) -> ScheduledOutcome {
    let outcome = indexnow.run_scheduled(Utc::now()).await;

    match &outcome {
        ScheduledOutcome::NotConfigured => {
            tracing::debug!("Sitemap tick skipped: no sitemap configured")
        }
        ScheduledOutcome::NotDue => tracing::debug!("Sitemap tick skipped: not due"),
        ScheduledOutcome::GateUnavailable { error } => {
            tracing::error!(error = %error, "Sitemap tick failed: gate unavailable")
        }
        ScheduledOutcome::Ran { report } => match &report.outcome {
            BulkOutcome::Submitted { .. } if report.is_success() => tracing::info!(
                sitemap_url = %report.sitemap_url,
                count = report.submitted_count(),
                "Scheduled sitemap submission complete"
            ),
            _ => tracing::error!(
                sitemap_url = %report.sitemap_url,
                message = %report.message(),
                "Scheduled sitemap submission failed"
            ),
        },
    }

    outcome
}
