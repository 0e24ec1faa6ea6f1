//! The site-side parameters of an IndexNow submission.

use crate::error::ConfigError;
use crate::security::SecretString;

/// Host, key and optional key location for one site.
///
/// Constructed from configuration and never mutated. Validation happens at
/// submission time so a half-configured site still records why it was refused.
#[derive(Debug, Clone, Default)]
pub struct SiteEndpoint {
    /// Bare hostname, e.g. `www.example.com`
    pub host: String,

    /// IndexNow key (secret)
    pub api_key: SecretString,

    /// URL where the key file is published
    pub key_location: Option<String>,
}

impl SiteEndpoint {
    /// Create an endpoint without a key location.
    pub fn new(host: impl Into<String>, api_key: impl Into<SecretString>) -> Self {
        Self {
            host: host.into().trim().to_string(),
            api_key: api_key.into(),
            key_location: None,
        }
    }

    /// Set the key location. Blank values clear it.
    pub fn with_key_location(mut self, key_location: impl Into<String>) -> Self {
        let key_location = key_location.into().trim().to_string();
        self.key_location = (!key_location.is_empty()).then_some(key_location);
        self
    }

    /// Check the invariants required before any submission.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::MissingHost);
        }
        if self.host.contains("://") || self.host.contains('/') {
            return Err(ConfigError::InvalidHost(self.host.clone()));
        }
        if self.api_key.is_blank() {
            return Err(ConfigError::MissingApiKey);
        }
        if let Some(location) = &self.key_location {
            let scheme_ok = url::Url::parse(location)
                .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
                .unwrap_or(false);
            if !scheme_ok {
                return Err(ConfigError::InvalidKeyLocation(location.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_endpoint() {
        let endpoint = SiteEndpoint::new("www.example.com", "abc123")
            .with_key_location("https://www.example.com/abc123.txt");
        assert!(endpoint.validate().is_ok());
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(
            SiteEndpoint::new("", "abc123").validate(),
            Err(ConfigError::MissingHost)
        );
        assert_eq!(
            SiteEndpoint::new("example.com", "").validate(),
            Err(ConfigError::MissingApiKey)
        );
    }

    #[test]
    fn test_host_with_scheme_rejected() {
        let endpoint = SiteEndpoint::new("https://example.com", "abc123");
        assert!(matches!(
            endpoint.validate(),
            Err(ConfigError::InvalidHost(_))
        ));
    }

    #[test]
    fn test_relative_key_location_rejected() {
        let endpoint = SiteEndpoint::new("example.com", "abc123").with_key_location("/abc123.txt");
        assert!(matches!(
            endpoint.validate(),
            Err(ConfigError::InvalidKeyLocation(_))
        ));
    }

    #[test]
    fn test_blank_key_location_is_none() {
        let endpoint = SiteEndpoint::new("example.com", "abc123").with_key_location("   ");
        assert!(endpoint.key_location.is_none());
        assert!(endpoint.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_key() {
        let endpoint = SiteEndpoint::new("example.com", "abc123");
        assert!(!format!("{:?}", endpoint).contains("abc123"));
    }
}
