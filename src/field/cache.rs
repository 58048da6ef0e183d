//! Fragment cache
//!
//! Sub-components are often shared by several pages. Caching the parsed
//! fragment by path means each shared file is read and tokenized once per
//! adapter, even when pages are processed in parallel.

use super::FragmentFields;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

pub const DEFAULT_CAPACITY: usize = 256;

pub struct FragmentCache {
    inner: Mutex<LruCache<PathBuf, FragmentFields>>,
}

impl FragmentCache {
    /// Create a cache holding up to `capacity` fragments (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        FragmentCache {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, path: &Path) -> Option<FragmentFields> {
        let hit = self.lock().get(path).cloned();
        if hit.is_some() {
            tracing::debug!(path = %path.display(), "fragment cache hit");
        }
        hit
    }

    pub fn insert(&self, fields: FragmentFields) {
        self.lock().put(fields.path.clone(), fields);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave a half-written entry, so
    // the poisoned guard is still usable.
    fn lock(&self) -> MutexGuard<'_, LruCache<PathBuf, FragmentFields>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for FragmentCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ResultSet;
    use crate::config::ExtractMode;
    use crate::core::tokenizer::Termination;

    fn fragment(path: &str) -> FragmentFields {
        FragmentFields {
            path: PathBuf::from(path),
            result: ResultSet::empty(ExtractMode::Documentation),
            termination: Termination::Exhausted,
        }
    }

    #[test]
    fn test_hit_and_miss() {
        let cache = FragmentCache::new(4);
        assert!(cache.get(Path::new("a.vue")).is_none());
        cache.insert(fragment("a.vue"));
        assert_eq!(cache.get(Path::new("a.vue")).unwrap().path, PathBuf::from("a.vue"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_least_recent() {
        let cache = FragmentCache::new(2);
        cache.insert(fragment("a.vue"));
        cache.insert(fragment("b.vue"));
        cache.get(Path::new("a.vue"));
        cache.insert(fragment("c.vue"));
        assert!(cache.get(Path::new("b.vue")).is_none());
        assert!(cache.get(Path::new("a.vue")).is_some());
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let cache = FragmentCache::new(0);
        cache.insert(fragment("a.vue"));
        assert_eq!(cache.len(), 1);
    }
}
