//! Inbound trigger payloads.

use serde::{Deserialize, Serialize};

/// Visibility of a content item at the time of the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Publish,
    Private,
    Draft,
    Hidden,
    Password,
    #[serde(untagged)]
    Other(String),
}

impl Visibility {
    pub fn is_public(&self) -> bool {
        matches!(self, Visibility::Publish)
    }
}

impl From<&str> for Visibility {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "publish" => Visibility::Publish,
            "private" => Visibility::Private,
            "draft" => Visibility::Draft,
            "hidden" => Visibility::Hidden,
            "password" => Visibility::Password,
            other => Visibility::Other(other.to_string()),
        }
    }
}

/// A content item was saved by the CMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishEvent {
    /// CMS item identifier
    pub id: i64,

    pub visibility: Visibility,

    /// Canonical URL of the item
    #[serde(default)]
    pub permalink: String,
}

impl PublishEvent {
    pub fn new(id: i64, visibility: Visibility, permalink: impl Into<String>) -> Self {
        Self {
            id,
            visibility,
            permalink: permalink.into(),
        }
    }

    /// Shorthand for a published item.
    pub fn published(id: i64, permalink: impl Into<String>) -> Self {
        Self::new(id, Visibility::Publish, permalink)
    }
}

/// Who triggered a unit of work, for the outcome log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub user_id: i64,
    pub user_ip: String,
}

impl RequestContext {
    pub fn new(user_id: i64, user_ip: impl Into<String>) -> Self {
        let user_ip = user_ip.into();
        Self {
            user_id,
            user_ip: if user_ip.trim().is_empty() {
                "unknown".to_string()
            } else {
                user_ip
            },
        }
    }

    /// Context for unattended (scheduled) runs.
    pub fn system() -> Self {
        Self::new(0, "system")
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(0, "unknown")
    }
}
