use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use indexnow::{IndexNowConfig, SecretString, SiteEndpoint, DEFAULT_ENDPOINT_URL};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Where outcome records and the gate marker are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogBackend {
    File,
    Sqlite,
}

impl FromStr for LogBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(LogBackend::File),
            "sqlite" => Ok(LogBackend::Sqlite),
            other => bail!("unknown log backend '{}', expected 'file' or 'sqlite'", other),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: SecretString,
    pub host: String,
    pub key_location: Option<String>,
    pub sitemap_url: Option<String>,
    pub save_log: bool,
    pub bulk_interval_seconds: u64,
    pub endpoint_url: String,
    pub log_backend: LogBackend,
    pub data_dir: PathBuf,
    pub database_url: String,
    pub tick_schedule: String,
    pub fetch_concurrency: usize,
    pub max_depth: usize,
    pub port: u16,
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("'{}' is not a boolean", other),
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration through a lookup function.
    ///
    /// Blank values count as unset. Missing host or key is not an error here;
    /// each submission refuses and records it instead.
    pub fn from_vars<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let data_dir = PathBuf::from(var("INDEXNOW_DATA_DIR").unwrap_or_else(|| "./data".to_string()));
        let database_url = var("DATABASE_URL")
            .unwrap_or_else(|| format!("sqlite://{}/indexnow.db?mode=rwc", data_dir.display()));

        Ok(Self {
            api_key: SecretString::new(var("INDEXNOW_API_KEY").unwrap_or_default()),
            host: var("INDEXNOW_HOST").unwrap_or_default(),
            key_location: var("INDEXNOW_KEY_LOCATION"),
            sitemap_url: var("INDEXNOW_SITEMAP_URL"),
            save_log: var("INDEXNOW_SAVE_LOG")
                .map(|v| parse_bool(&v))
                .transpose()
                .context("INDEXNOW_SAVE_LOG must be a boolean")?
                .unwrap_or(true),
            bulk_interval_seconds: var("INDEXNOW_BULK_INTERVAL_SECONDS")
                .unwrap_or_else(|| "86400".to_string())
                .parse()
                .context("INDEXNOW_BULK_INTERVAL_SECONDS must be a valid number")?,
            endpoint_url: var("INDEXNOW_ENDPOINT_URL")
                .unwrap_or_else(|| DEFAULT_ENDPOINT_URL.to_string()),
            log_backend: var("INDEXNOW_LOG_BACKEND")
                .unwrap_or_else(|| "file".to_string())
                .parse()
                .context("INDEXNOW_LOG_BACKEND is invalid")?,
            data_dir,
            database_url,
            tick_schedule: var("INDEXNOW_TICK_SCHEDULE")
                .unwrap_or_else(|| "0 */15 * * * *".to_string()),
            fetch_concurrency: var("INDEXNOW_FETCH_CONCURRENCY")
                .unwrap_or_else(|| "4".to_string())
                .parse()
                .context("INDEXNOW_FETCH_CONCURRENCY must be a valid number")?,
            max_depth: var("INDEXNOW_MAX_DEPTH")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .context("INDEXNOW_MAX_DEPTH must be a valid number")?,
            port: var("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
        })
    }

    pub fn endpoint(&self) -> SiteEndpoint {
        let endpoint = SiteEndpoint::new(self.host.clone(), self.api_key.clone());
        match &self.key_location {
            Some(location) => endpoint.with_key_location(location.clone()),
            None => endpoint,
        }
    }

    /// Pipeline settings for this site.
    pub fn indexnow_config(&self) -> IndexNowConfig {
        let config = IndexNowConfig::new(self.endpoint())
            .with_logging(self.save_log)
            .with_bulk_interval(Duration::from_secs(self.bulk_interval_seconds))
            .with_fetch_concurrency(self.fetch_concurrency)
            .with_max_depth(self.max_depth);

        match &self.sitemap_url {
            Some(url) => config.with_sitemap_url(url.clone()),
            None => config,
        }
    }
}
