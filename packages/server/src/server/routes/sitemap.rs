use axum::{extract::Extension, Json};
use indexnow::{BulkReport, ScheduledOutcome, SubmissionResult};
use serde::{Deserialize, Serialize};

use super::publish::request_context;
use crate::kernel::{run_scheduled_tick, ServerDeps};
use crate::server::middleware::ClientIp;

/// Body of `POST /sitemap/submit`. Both fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct SitemapSubmitRequest {
    pub sitemap_url: Option<String>,
    #[serde(default)]
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub success: bool,
    pub http_status: u16,
    pub submitted_count: usize,
    pub message: String,
}

impl From<&SubmissionResult> for BatchResponse {
    fn from(result: &SubmissionResult) -> Self {
        Self {
            success: result.is_success(),
            http_status: result.status_code(),
            submitted_count: result.submitted_count,
            message: result.message(),
        }
    }
}

/// Operator-facing view of a sitemap run.
#[derive(Debug, Serialize)]
pub struct BulkReportResponse {
    pub success: bool,
    pub message: String,
    pub sitemap_url: String,
    pub discovered: usize,
    pub results: Vec<BatchResponse>,
}

impl From<&BulkReport> for BulkReportResponse {
    fn from(report: &BulkReport) -> Self {
        Self {
            success: report.is_success(),
            message: report.message(),
            sitemap_url: report.sitemap_url.clone(),
            discovered: report.discovered,
            results: report.results().iter().map(BatchResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TickResponse {
    NotConfigured,
    NotDue,
    GateUnavailable { error: String },
    Ran { report: BulkReportResponse },
}

impl From<&ScheduledOutcome> for TickResponse {
    fn from(outcome: &ScheduledOutcome) -> Self {
        match outcome {
            ScheduledOutcome::NotConfigured => TickResponse::NotConfigured,
            ScheduledOutcome::NotDue => TickResponse::NotDue,
            ScheduledOutcome::GateUnavailable { error } => TickResponse::GateUnavailable {
                error: error.clone(),
            },
            ScheduledOutcome::Ran { report } => TickResponse::Ran {
                report: report.into(),
            },
        }
    }
}

/// Manual sitemap submission. Always runs, ignoring the gate.
pub async fn sitemap_submit_handler(
    Extension(deps): Extension<ServerDeps>,
    client_ip: Option<Extension<ClientIp>>,
    body: Option<Json<SitemapSubmitRequest>>,
) -> Json<BulkReportResponse> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let ctx = request_context(request.user_id, client_ip);

    let report = deps
        .indexnow
        .handle_manual_submit(request.sitemap_url.as_deref(), &ctx)
        .await;

    Json(BulkReportResponse::from(&report))
}

/// Gate-checked sitemap run, same as the periodic scheduler.
pub async fn sitemap_tick_handler(Extension(deps): Extension<ServerDeps>) -> Json<TickResponse> {
    let outcome = run_scheduled_tick(&deps.indexnow).await;
    Json(TickResponse::from(&outcome))
}
