//! Sitemap parsing and recursive resolution.
//!
//! - [`parse_sitemap`] classifies one document
//! - [`SitemapResolver`] follows sitemap indexes into a flat [`UrlSet`](crate::UrlSet)

mod parser;
mod resolver;

pub use parser::parse_sitemap;
pub use resolver::{SitemapResolver, VisitedSet};
