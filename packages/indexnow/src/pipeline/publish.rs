use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::IndexNow;
use crate::error::ConfigError;
use crate::traits::{
    fetcher::Fetcher,
    gate_store::GateStore,
    notifier::{preflight, Notifier},
    recorder::OutcomeRecorder,
};
use crate::types::{
    event::{PublishEvent, RequestContext, Visibility},
    record::{OutcomeRecord, RecordSubject},
    submission::SubmissionResult,
    url_set::UrlSet,
};

/// What the publish path did with an event.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// Not a public item; nothing submitted or recorded
    Ignored { visibility: Visibility },

    /// Submission attempted (or refused by preflight) and recorded
    Submitted { result: SubmissionResult },
}

impl PublishOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PublishOutcome::Submitted { result } if result.is_success())
    }

    pub fn result(&self) -> Option<&SubmissionResult> {
        match self {
            PublishOutcome::Submitted { result } => Some(result),
            PublishOutcome::Ignored { .. } => None,
        }
    }
}

impl<F, N, R, G> IndexNow<F, N, R, G>
where
    F: Fetcher,
    N: Notifier,
    R: OutcomeRecorder,
    G: GateStore,
{
    /// Announce a single published item.
    pub async fn handle_publish(&self, event: &PublishEvent, ctx: &RequestContext) -> PublishOutcome {
        if !event.visibility.is_public() {
            debug!(id = event.id, visibility = ?event.visibility, "Ignoring non-public item");
            return PublishOutcome::Ignored {
                visibility: event.visibility.clone(),
            };
        }

        let subject = RecordSubject::Post(event.id);
        let permalink = event.permalink.trim();
        let urls = if permalink.is_empty() {
            UrlSet::new()
        } else {
            UrlSet::single(permalink)
        };

        let checked = if urls.is_empty() {
            Err(ConfigError::MissingPermalink)
        } else {
            preflight(&self.config.endpoint, &urls)
        };

        let result = match checked {
            Err(e) => {
                warn!(id = event.id, error = %e, "Publish submission refused");
                SubmissionResult::config_failure(e, urls.len())
            }
            Ok(()) => {
                let result = self
                    .notifier
                    .submit(&self.config.endpoint, &urls, self.config.timeouts.single_submit)
                    .await;
                info!(
                    id = event.id,
                    url = %permalink,
                    http_status = result.status_code(),
                    success = result.is_success(),
                    "Published item submitted"
                );
                result
            }
        };

        self.record(OutcomeRecord::from_submission(subject, &result, ctx))
            .await;

        PublishOutcome::Submitted { result }
    }
}

impl<F, N, R, G> IndexNow<F, N, R, G>
where
    F: Fetcher + 'static,
    N: Notifier + 'static,
    R: OutcomeRecorder + 'static,
    G: GateStore + 'static,
{
    /// Run [`handle_publish`](Self::handle_publish) on a background task.
    pub fn spawn_publish(
        self: &Arc<Self>,
        event: PublishEvent,
        ctx: RequestContext,
    ) -> JoinHandle<PublishOutcome> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.handle_publish(&event, &ctx).await })
    }
}
