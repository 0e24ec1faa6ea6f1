//! Fetcher implementations.
//!
//! # Available Fetchers
//!
//! - `HttpFetcher` - reqwest-based, follows redirects
//! - `MockFetcher` - For testing
//!
//! # Example
//!
//! ```rust,ignore
//! use indexnow::fetchers::HttpFetcher;
//!
//! let fetcher = HttpFetcher::new()?;
//! let body = fetcher.fetch("https://example.com/sitemap.xml", Duration::from_secs(15)).await?;
//! ```

mod http;
mod mock;

pub use http::HttpFetcher;
pub use mock::MockFetcher;

// Re-export from traits for convenience
pub use crate::traits::fetcher::Fetcher;
