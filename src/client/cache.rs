//! Revision-keyed cache for the merged site content.

use crate::models::SiteContent;

#[derive(Debug, Clone)]
struct CachedContent {
    revision_id: i64,
    content: SiteContent,
}

/// Holds at most one content document together with the revision it was read at.
///
/// A lookup only hits when the caller's current server revision equals the cached
/// one, so any write on the server makes the entry stale.
#[derive(Debug, Clone, Default)]
pub struct ContentCache {
    entry: Option<CachedContent>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, current_revision: i64) -> Option<&SiteContent> {
        self.entry
            .as_ref()
            .filter(|cached| cached.revision_id == current_revision)
            .map(|cached| &cached.content)
    }

    pub fn store(&mut self, revision_id: i64, content: SiteContent) {
        self.entry = Some(CachedContent {
            revision_id,
            content,
        });
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Revision of the cached document, if any.
    pub fn revision(&self) -> Option<i64> {
        self.entry.as_ref().map(|cached| cached.revision_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content_with_title(title: &str) -> SiteContent {
        let mut content = SiteContent::default();
        content
            .sections
            .insert("hero".to_string(), json!({ "title": title }));
        content
    }

    #[test]
    fn test_empty_cache_misses() {
        let cache = ContentCache::new();
        assert!(cache.get(0).is_none());
        assert_eq!(cache.revision(), None);
    }

    #[test]
    fn test_hit_only_on_matching_revision() {
        let mut cache = ContentCache::new();
        cache.store(4, content_with_title("Grow"));

        assert_eq!(cache.get(4), Some(&content_with_title("Grow")));
        assert!(cache.get(5).is_none());
        assert!(cache.get(3).is_none());
    }

    #[test]
    fn test_store_replaces_entry() {
        let mut cache = ContentCache::new();
        cache.store(1, content_with_title("Old"));
        cache.store(2, content_with_title("New"));

        assert!(cache.get(1).is_none());
        assert_eq!(cache.get(2), Some(&content_with_title("New")));
    }

    #[test]
    fn test_invalidate() {
        let mut cache = ContentCache::new();
        cache.store(7, content_with_title("Grow"));
        cache.invalidate();

        assert!(cache.get(7).is_none());
        assert_eq!(cache.revision(), None);
    }
}
