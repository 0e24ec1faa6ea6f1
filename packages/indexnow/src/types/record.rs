//! Entries written to the outcome log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::event::RequestContext;
use crate::types::submission::SubmissionResult;

/// What an outcome entry is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSubject {
    /// A single published item
    Post(i64),
    /// A sitemap run
    Bulk,
}

impl fmt::Display for RecordSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSubject::Post(id) => write!(f, "{}", id),
            RecordSubject::Bulk => f.write_str("bulk"),
        }
    }
}

/// One outcome log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub subject: RecordSubject,

    /// HTTP status, `0` when no response was received
    pub http_status: u16,

    pub message: String,
    pub user_id: i64,
    pub user_ip: String,

    /// URLs included, for bulk entries
    pub submitted_count: Option<usize>,

    pub timestamp: DateTime<Utc>,
}

impl OutcomeRecord {
    pub fn new(subject: RecordSubject, message: impl Into<String>, ctx: &RequestContext) -> Self {
        Self {
            subject,
            http_status: 0,
            message: message.into(),
            user_id: ctx.user_id,
            user_ip: ctx.user_ip.clone(),
            submitted_count: None,
            timestamp: Utc::now(),
        }
    }

    /// Build an entry from a notifier result.
    pub fn from_submission(
        subject: RecordSubject,
        result: &SubmissionResult,
        ctx: &RequestContext,
    ) -> Self {
        let mut record = Self::new(subject, result.message(), ctx);
        record.http_status = result.status_code();
        record.timestamp = result.timestamp;
        if subject == RecordSubject::Bulk {
            record.submitted_count = Some(result.submitted_count);
        }
        record
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = status;
        self
    }

    pub fn with_submitted_count(mut self, count: usize) -> Self {
        self.submitted_count = Some(count);
        self
    }

    pub fn is_bulk(&self) -> bool {
        self.subject == RecordSubject::Bulk
    }

    /// Render in the plain-text log format.
    pub fn to_log_entry(&self) -> String {
        let mut entry = format!(
            "[{}] PostID: {}, User: {}, IP: {}, HTTP: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.subject,
            self.user_id,
            self.user_ip,
            self.http_status
        );
        if let Some(count) = self.submitted_count {
            entry.push_str(&format!(", URLs: {}", count));
        }
        entry.push('\n');
        entry.push_str(&format!("Message: {}\n", self.message));
        entry.push_str(&"-".repeat(80));
        entry.push('\n');
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_entry_format() {
        let ctx = RequestContext::new(1, "203.0.113.9");
        let mut record = OutcomeRecord::new(RecordSubject::Post(42), "submitted successfully: ", &ctx)
            .with_status(200);
        record.timestamp = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();

        let entry = record.to_log_entry();
        let lines: Vec<&str> = entry.lines().collect();
        assert_eq!(
            lines[0],
            "[2024-03-01 08:30:00] PostID: 42, User: 1, IP: 203.0.113.9, HTTP: 200"
        );
        assert_eq!(lines[1], "Message: submitted successfully: ");
        assert_eq!(lines[2], "-".repeat(80));
    }

    #[test]
    fn test_bulk_entry_has_count() {
        let result = SubmissionResult::from_response(200, "", 25);
        let record =
            OutcomeRecord::from_submission(RecordSubject::Bulk, &result, &RequestContext::system());
        assert_eq!(record.submitted_count, Some(25));
        assert!(record.to_log_entry().contains("PostID: bulk"));
        assert!(record.to_log_entry().contains(", URLs: 25"));
    }

    #[test]
    fn test_post_entry_has_no_count() {
        let result = SubmissionResult::from_response(200, "", 1);
        let record = OutcomeRecord::from_submission(
            RecordSubject::Post(7),
            &result,
            &RequestContext::default(),
        );
        assert_eq!(record.submitted_count, None);
        assert_eq!(record.http_status, 200);
    }
}
