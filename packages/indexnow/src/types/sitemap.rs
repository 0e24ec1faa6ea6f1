//! Parsed sitemap documents.

/// Classification of a sitemap document by its root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapNode {
    /// `<sitemapindex>`: URLs of further sitemap documents
    Index(Vec<String>),

    /// `<urlset>`: page URLs
    UrlList(Vec<String>),

    /// Any other root element
    Unrecognized(String),
}

impl SitemapNode {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            SitemapNode::Index(_) => "sitemapindex",
            SitemapNode::UrlList(_) => "urlset",
            SitemapNode::Unrecognized(_) => "unrecognized",
        }
    }

    /// Number of `loc` entries found.
    pub fn entry_count(&self) -> usize {
        match self {
            SitemapNode::Index(locs) | SitemapNode::UrlList(locs) => locs.len(),
            SitemapNode::Unrecognized(_) => 0,
        }
    }
}
