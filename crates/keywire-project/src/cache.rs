use rustc_hash::{FxHashMap, FxHasher};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::debug;

use crate::kle::KleLayout;
use crate::Error;

/// Content hash of raw layout text.
#[must_use]
pub fn content_hash(text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Parsed layouts keyed by the hash of their source text.
///
/// Owned by the caller; nothing is cached unless a cache is passed in.
#[derive(Debug, Default)]
pub struct LayoutCache {
    entries: FxHashMap<u64, (String, Arc<KleLayout>)>,
}

impl LayoutCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, text: &str) -> Option<Arc<KleLayout>> {
        self.entries
            .get(&content_hash(text))
            .filter(|(source, _)| source == text)
            .map(|(_, layout)| Arc::clone(layout))
    }

    pub fn insert(&mut self, text: &str, layout: KleLayout) -> Arc<KleLayout> {
        let layout = Arc::new(layout);
        self.entries
            .insert(content_hash(text), (text.to_string(), Arc::clone(&layout)));
        layout
    }

    /// Cached layout for `text`, parsing it on a miss.
    pub fn get_or_parse(&mut self, text: &str) -> Result<Arc<KleLayout>, Error> {
        if let Some(layout) = self.get(text) {
            debug!("layout cache hit");
            return Ok(layout);
        }
        let layout = KleLayout::parse_str(text)?;
        Ok(self.insert(text, layout))
    }

    /// Drop the entry for `text`; returns whether one existed.
    pub fn evict(&mut self, text: &str) -> bool {
        let hash = content_hash(text);
        let present = self
            .entries
            .get(&hash)
            .is_some_and(|(source, _)| source == text);
        if present {
            self.entries.remove(&hash);
        }
        present
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = r#"[["A","B"]]"#;

    #[test]
    fn second_lookup_shares_the_parse() {
        let mut cache = LayoutCache::new();
        let a = cache.get_or_parse(TEXT).unwrap();
        let b = cache.get_or_parse(TEXT).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn evict_and_clear() {
        let mut cache = LayoutCache::new();
        cache.get_or_parse(TEXT).unwrap();
        cache.get_or_parse(r#"[["C"]]"#).unwrap();
        assert!(!cache.evict(r#"[["D"]]"#));
        assert!(cache.evict(TEXT));
        assert!(cache.get(TEXT).is_none());
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn parse_errors_are_not_cached() {
        let mut cache = LayoutCache::new();
        assert!(cache.get_or_parse("[[1]]").is_err());
        assert!(cache.is_empty());
    }
}
