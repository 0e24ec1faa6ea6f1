//! Recursive sitemap resolution.
//!
//! Depth-first over sitemap indexes, cycle-safe and depth-capped. Child
//! sitemaps of an index are resolved concurrently; a semaphore bounds the
//! number of fetches in flight across the whole tree. Every failure below the
//! root is absorbed: a broken child contributes nothing and the rest of the
//! tree still resolves.

use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::sitemap::parse_sitemap;
use crate::traits::fetcher::Fetcher;
use crate::types::{config::ResolverConfig, sitemap::SitemapNode, url_set::UrlSet};

/// Sitemap URLs already visited during one resolution.
///
/// Shared by all concurrent branches; cloning shares the same set.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet(Arc<Mutex<HashSet<String>>>);

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `url` visited. Returns false if it already was.
    pub fn insert(&self, url: &str) -> bool {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Expands a sitemap (or sitemap index tree) into its page URLs.
///
/// # Example
///
/// ```rust,ignore
/// use indexnow::{HttpFetcher, SitemapResolver};
///
/// let resolver = SitemapResolver::new(HttpFetcher::new()?);
/// let urls = resolver.resolve("https://example.com/sitemap.xml").await;
/// ```
pub struct SitemapResolver<F: Fetcher> {
    fetcher: F,
    config: ResolverConfig,
    permits: Arc<Semaphore>,
}

impl<F: Fetcher> SitemapResolver<F> {
    /// Create a resolver with default limits.
    pub fn new(fetcher: F) -> Self {
        Self::with_config(fetcher, ResolverConfig::default())
    }

    /// Create a resolver with custom limits.
    pub fn with_config(fetcher: F, config: ResolverConfig) -> Self {
        let concurrency = config.concurrency.max(1);
        Self {
            fetcher,
            config: ResolverConfig {
                concurrency,
                ..config
            },
            permits: Arc::new(Semaphore::new(concurrency)),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `root_url` with the configured depth cap and a fresh visited set.
    pub async fn resolve(&self, root_url: &str) -> UrlSet {
        self.resolve_with(root_url, self.config.max_depth, VisitedSet::new())
            .await
    }

    /// Resolve `root_url`, skipping anything already in `visited`.
    ///
    /// The root is depth 0; an index at depth `d` only has its children
    /// followed when `d + 1 <= max_depth`.
    pub async fn resolve_with(&self, root_url: &str, max_depth: usize, visited: VisitedSet) -> UrlSet {
        let root = root_url.trim().to_string();
        info!(
            url = %root,
            max_depth,
            concurrency = self.config.concurrency,
            fetcher = self.fetcher.name(),
            "Sitemap resolution starting"
        );

        let urls = self
            .resolve_node(root.clone(), 0, max_depth, visited.clone())
            .await;

        info!(
            url = %root,
            urls_found = urls.len(),
            sitemaps_visited = visited.len(),
            "Sitemap resolution completed"
        );

        urls
    }

    fn resolve_node(
        &self,
        url: String,
        depth: usize,
        max_depth: usize,
        visited: VisitedSet,
    ) -> BoxFuture<'_, UrlSet> {
        async move {
            if url.is_empty() {
                return UrlSet::new();
            }
            if !visited.insert(&url) {
                debug!(url = %url, depth, "Sitemap already visited, skipping");
                return UrlSet::new();
            }

            let bytes = {
                // Permit covers the network read only, never the recursion
                let _permit = self.permits.acquire().await.ok();
                match self.fetcher.fetch(&url, self.config.fetch_timeout).await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!(url = %url, depth, error = %e, "Failed to fetch sitemap");
                        return UrlSet::new();
                    }
                }
            };

            let node = match parse_sitemap(&bytes) {
                Ok(node) => node,
                Err(e) => {
                    warn!(url = %url, depth, error = %e, "Failed to parse sitemap");
                    return UrlSet::new();
                }
            };

            debug!(
                url = %url,
                depth,
                kind = node.kind(),
                entries = node.entry_count(),
                "Sitemap parsed"
            );

            match node {
                SitemapNode::UrlList(locs) => locs.into_iter().collect(),
                SitemapNode::Index(children) => {
                    if depth >= max_depth {
                        warn!(
                            url = %url,
                            depth,
                            max_depth,
                            skipped = children.len(),
                            "Sitemap index nesting exceeds depth cap"
                        );
                        return UrlSet::new();
                    }

                    // buffered (not buffer_unordered) keeps children in document order
                    let branches: Vec<UrlSet> = stream::iter(children)
                        .map(|child| {
                            self.resolve_node(child, depth + 1, max_depth, visited.clone())
                        })
                        .buffered(self.config.concurrency)
                        .collect()
                        .await;

                    let mut merged = UrlSet::new();
                    for branch in branches {
                        merged.merge(branch);
                    }
                    merged
                }
                SitemapNode::Unrecognized(root) => {
                    debug!(url = %url, root = %root, "Unrecognized sitemap root, ignoring");
                    UrlSet::new()
                }
            }
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::MockFetcher;
    use crate::testing::{sitemap_index as index, urlset};
    use std::time::Duration;

    #[tokio::test]
    async fn test_resolve_urlset_dedupes() {
        let mock = MockFetcher::new().with_document(
            "https://example.com/sitemap.xml",
            urlset(&["https://example.com/a", "https://example.com/b", " https://example.com/a "]),
        );
        let resolver = SitemapResolver::new(mock);

        let urls = resolver.resolve("https://example.com/sitemap.xml").await;
        assert_eq!(
            urls.iter().collect::<Vec<_>>(),
            vec!["https://example.com/a", "https://example.com/b"]
        );
    }

    #[tokio::test]
    async fn test_resolve_index_unions_children() {
        let mock = MockFetcher::new()
            .with_document(
                "https://example.com/sitemap.xml",
                index(&["https://example.com/s1.xml", "https://example.com/s2.xml"]),
            )
            .with_document("https://example.com/s1.xml", urlset(&["A", "B"]))
            .with_document("https://example.com/s2.xml", urlset(&["B", "C"]));
        let resolver = SitemapResolver::new(mock);

        let urls = resolver.resolve("https://example.com/sitemap.xml").await;
        assert_eq!(urls.iter().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_broken_child_is_absorbed() {
        let mock = MockFetcher::new()
            .with_document(
                "https://example.com/sitemap.xml",
                index(&[
                    "https://example.com/gone.xml",
                    "https://example.com/bad.xml",
                    "https://example.com/ok.xml",
                ]),
            )
            .with_document("https://example.com/bad.xml", "<urlset><url>")
            .with_document("https://example.com/ok.xml", urlset(&["https://example.com/x"]));
        let resolver = SitemapResolver::new(mock);

        let urls = resolver.resolve("https://example.com/sitemap.xml").await;
        assert_eq!(urls.iter().collect::<Vec<_>>(), vec!["https://example.com/x"]);
    }

    #[tokio::test]
    async fn test_self_reference_terminates() {
        let mock = MockFetcher::new()
            .with_document(
                "https://example.com/sitemap.xml",
                index(&["https://example.com/sitemap.xml", "https://example.com/s1.xml"]),
            )
            .with_document("https://example.com/s1.xml", urlset(&["https://example.com/a"]));
        let resolver = SitemapResolver::new(mock.clone());

        let urls = resolver.resolve("https://example.com/sitemap.xml").await;
        assert_eq!(urls.len(), 1);
        assert_eq!(mock.calls_for("https://example.com/sitemap.xml"), 1);
    }

    #[tokio::test]
    async fn test_transitive_cycle_terminates() {
        let mock = MockFetcher::new()
            .with_document(
                "https://example.com/a.xml",
                index(&["https://example.com/b.xml"]),
            )
            .with_document(
                "https://example.com/b.xml",
                index(&["https://example.com/a.xml", "https://example.com/leaf.xml"]),
            )
            .with_document("https://example.com/leaf.xml", urlset(&["https://example.com/p"]));
        let resolver = SitemapResolver::new(mock.clone());

        let urls = resolver.resolve("https://example.com/a.xml").await;
        assert_eq!(urls.iter().collect::<Vec<_>>(), vec!["https://example.com/p"]);
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_shared_child_fetched_once() {
        let mock = MockFetcher::new()
            .with_document(
                "https://example.com/root.xml",
                index(&["https://example.com/i1.xml", "https://example.com/i2.xml"]),
            )
            .with_document("https://example.com/i1.xml", index(&["https://example.com/shared.xml"]))
            .with_document("https://example.com/i2.xml", index(&["https://example.com/shared.xml"]))
            .with_document("https://example.com/shared.xml", urlset(&["https://example.com/s"]));
        let resolver = SitemapResolver::new(mock.clone());

        let urls = resolver.resolve("https://example.com/root.xml").await;
        assert_eq!(urls.len(), 1);
        assert_eq!(mock.calls_for("https://example.com/shared.xml"), 1);
    }

    #[tokio::test]
    async fn test_depth_cap() {
        let mock = MockFetcher::new()
            .with_document("https://example.com/d0.xml", index(&["https://example.com/d1.xml"]))
            .with_document("https://example.com/d1.xml", index(&["https://example.com/d2.xml"]))
            .with_document("https://example.com/d2.xml", urlset(&["https://example.com/deep"]));
        let resolver = SitemapResolver::new(mock.clone());

        let capped = resolver
            .resolve_with("https://example.com/d0.xml", 1, VisitedSet::new())
            .await;
        assert!(capped.is_empty());
        assert_eq!(mock.calls_for("https://example.com/d2.xml"), 0);

        let full = resolver
            .resolve_with("https://example.com/d0.xml", 2, VisitedSet::new())
            .await;
        assert_eq!(full.iter().collect::<Vec<_>>(), vec!["https://example.com/deep"]);
    }

    #[tokio::test]
    async fn test_previsited_root_returns_empty() {
        let mock = MockFetcher::new()
            .with_document("https://example.com/sitemap.xml", urlset(&["https://example.com/a"]));
        let resolver = SitemapResolver::new(mock.clone());

        let visited = VisitedSet::new();
        visited.insert("https://example.com/sitemap.xml");

        let urls = resolver
            .resolve_with("https://example.com/sitemap.xml", 10, visited)
            .await;
        assert!(urls.is_empty());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unrecognized_and_unreachable_root() {
        let mock = MockFetcher::new().with_document("https://example.com/feed.xml", "<rss></rss>");
        let resolver = SitemapResolver::new(mock);

        assert!(resolver.resolve("https://example.com/feed.xml").await.is_empty());
        assert!(resolver.resolve("https://unreachable.invalid/sitemap.xml").await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_concurrency_is_bounded() {
        let children: Vec<String> = (0..12)
            .map(|i| format!("https://example.com/s{}.xml", i))
            .collect();
        let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();

        let mock = MockFetcher::new()
            .with_delay(Duration::from_millis(20))
            .with_document("https://example.com/sitemap.xml", index(&child_refs));
        for (i, child) in children.iter().enumerate() {
            mock.add_document(child.clone(), urlset(&[format!("https://example.com/p{}", i).as_str()]));
        }

        let config = ResolverConfig {
            concurrency: 3,
            ..ResolverConfig::default()
        };
        let resolver = SitemapResolver::with_config(mock.clone(), config);

        let urls = resolver.resolve("https://example.com/sitemap.xml").await;
        assert_eq!(urls.len(), 12);
        assert!(mock.max_in_flight() <= 3, "saw {} in flight", mock.max_in_flight());
        assert!(mock.max_in_flight() > 1);
        // Document order is preserved
        assert_eq!(urls.iter().next(), Some("https://example.com/p0"));
    }
}
