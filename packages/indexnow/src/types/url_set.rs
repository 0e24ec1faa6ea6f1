//! Deduplicated URL collection.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A set of absolute URLs.
///
/// Uniqueness is exact string equality after trimming. Insertion order is kept
/// only so logs and payloads are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UrlSet(IndexSet<String>);

impl UrlSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding exactly one URL.
    pub fn single(url: impl Into<String>) -> Self {
        let mut set = Self::new();
        set.insert(url);
        set
    }

    /// Insert a URL. Blank values are ignored. Returns true if it was new.
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return false;
        }
        if trimmed.len() == url.len() {
            self.0.insert(url)
        } else {
            self.0.insert(trimmed.to_string())
        }
    }

    /// Union another set into this one, keeping first-seen order.
    pub fn merge(&mut self, other: UrlSet) {
        self.0.extend(other.0);
    }

    pub fn contains(&self, url: &str) -> bool {
        self.0.contains(url.trim())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Split into consecutive sets of at most `size` URLs.
    pub fn chunks(&self, size: usize) -> Vec<UrlSet> {
        let size = size.max(1);
        self.0
            .iter()
            .collect::<Vec<_>>()
            .chunks(size)
            .map(|chunk| chunk.iter().map(|u| (*u).clone()).collect())
            .collect()
    }
}

impl FromIterator<String> for UrlSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = Self::new();
        for url in iter {
            set.insert(url);
        }
        set
    }
}

impl<'a> FromIterator<&'a str> for UrlSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}

impl IntoIterator for UrlSet {
    type Item = String;
    type IntoIter = indexmap::set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_trims_and_dedupes() {
        let mut set = UrlSet::new();
        assert!(set.insert("https://example.com/a"));
        assert!(!set.insert("  https://example.com/a\n"));
        assert!(!set.insert("   "));
        assert!(set.insert("https://example.com/A"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_no_normalization() {
        let set: UrlSet = ["https://example.com/a", "https://example.com/a/", "http://example.com/a"]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_merge_keeps_first_seen_order() {
        let mut left: UrlSet = ["a", "b"].into_iter().collect();
        let right: UrlSet = ["b", "c"].into_iter().collect();
        left.merge(right);
        assert_eq!(left.iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_chunks() {
        let set: UrlSet = ["a", "b", "c", "d", "e"].into_iter().collect();
        let chunks = set.chunks(2);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].iter().collect::<Vec<_>>(), vec!["e"]);

        assert_eq!(UrlSet::new().chunks(10).len(), 0);
    }

    #[test]
    fn test_serializes_as_array() {
        let set: UrlSet = ["https://example.com/a", "https://example.com/b"].into_iter().collect();
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json, serde_json::json!(["https://example.com/a", "https://example.com/b"]));
    }
}
