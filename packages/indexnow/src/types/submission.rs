//! Outcome of a single notification request.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ConfigError;

/// How a submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// HTTP 200
    Accepted,
    /// Any other HTTP status
    Rejected,
    /// No HTTP response
    TransportFailed,
    /// Refused before any HTTP attempt
    ConfigRejected,
}

/// Result of one call to a [`Notifier`](crate::traits::notifier::Notifier).
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResult {
    /// Status code, absent when no response was received
    pub http_status: Option<u16>,

    /// Response body, verbatim
    pub response_body: String,

    /// Transport-level failure description
    pub transport_error: Option<String>,

    /// Why the request was refused without a network call
    pub config_error: Option<ConfigError>,

    /// Number of URLs in the request
    pub submitted_count: usize,

    pub timestamp: DateTime<Utc>,
}

impl SubmissionResult {
    /// The endpoint answered.
    pub fn from_response(status: u16, body: impl Into<String>, submitted_count: usize) -> Self {
        Self {
            http_status: Some(status),
            response_body: body.into(),
            transport_error: None,
            config_error: None,
            submitted_count,
            timestamp: Utc::now(),
        }
    }

    /// The request never got a response.
    pub fn transport_failure(error: impl Into<String>, submitted_count: usize) -> Self {
        Self {
            http_status: None,
            response_body: String::new(),
            transport_error: Some(error.into()),
            config_error: None,
            submitted_count,
            timestamp: Utc::now(),
        }
    }

    /// The request was refused before sending.
    pub fn config_failure(error: ConfigError, submitted_count: usize) -> Self {
        Self {
            http_status: None,
            response_body: String::new(),
            transport_error: None,
            config_error: Some(error),
            submitted_count,
            timestamp: Utc::now(),
        }
    }

    pub fn outcome(&self) -> SubmissionOutcome {
        if self.config_error.is_some() {
            SubmissionOutcome::ConfigRejected
        } else if self.transport_error.is_some() {
            SubmissionOutcome::TransportFailed
        } else if self.http_status == Some(200) {
            SubmissionOutcome::Accepted
        } else {
            SubmissionOutcome::Rejected
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome() == SubmissionOutcome::Accepted
    }

    /// Status for the outcome log, `0` when there was no response.
    pub fn status_code(&self) -> u16 {
        self.http_status.unwrap_or(0)
    }

    /// One-line description for the outcome log.
    pub fn message(&self) -> String {
        match self.outcome() {
            SubmissionOutcome::Accepted => format!("submitted successfully: {}", self.response_body),
            SubmissionOutcome::Rejected => {
                format!("HTTP {} - {}", self.status_code(), self.response_body)
            }
            SubmissionOutcome::TransportFailed => format!(
                "transport error: {}",
                self.transport_error.as_deref().unwrap_or_default()
            ),
            SubmissionOutcome::ConfigRejected => match &self.config_error {
                Some(err) => format!("configuration error: {}", err),
                None => "configuration error".to_string(),
            },
        }
    }
}
