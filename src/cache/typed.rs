//! Typed cache wrapper around Moka.

use std::hash::Hash;
use std::sync::Arc;

use moka::sync::Cache;
use tracing::warn;

use super::CacheConfig;

/// A typed, bounded cache with a small API over Moka.
///
/// Cloning is cheap and shares the same underlying cache.
pub struct TypedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Cache<K, V>>,
    name: Arc<str>,
}

// Manual Clone implementation that doesn't require K: Clone
impl<K, V> Clone for TypedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            name: Arc::clone(&self.name),
        }
    }
}

impl<K, V> TypedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a new typed cache with the given name and config.
    pub fn new(name: impl Into<Arc<str>>, config: CacheConfig) -> Self {
        let mut builder = Cache::builder()
            .max_capacity(config.max_capacity)
            .support_invalidation_closures();

        if let Some(tti) = config.tti {
            builder = builder.time_to_idle(tti);
        }

        Self {
            inner: Arc::new(builder.build()),
            name: name.into(),
        }
    }

    pub fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value);
    }

    /// Returns `Some(value)` if the key exists and hasn't been evicted.
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key)
    }

    /// Remove all entries from the cache.
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Remove every entry whose key matches `predicate`.
    ///
    /// Removal happens lazily; matching entries are never returned by `get`
    /// once this call returns.
    pub fn invalidate_where<F>(&self, predicate: F)
    where
        F: Fn(&K, &V) -> bool + Send + Sync + 'static,
    {
        if let Err(e) = self.inner.invalidate_entries_if(predicate) {
            warn!("Cache '{}' rejected invalidation: {}", self.name, e);
            self.inner.invalidate_all();
        }
    }

    /// Number of entries.
    ///
    /// Note: pending maintenance is flushed first, so this is exact only in
    /// the absence of concurrent writers.
    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }
}

impl<K, V> std::fmt::Debug for TypedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedCache")
            .field("name", &self.name)
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_invalidate_all() {
        let cache: TypedCache<(u64, String), String> =
            TypedCache::new("values", CacheConfig::with_capacity(16));

        cache.insert((1, "steve".into()), "a".into());
        cache.insert((2, "steve".into()), "b".into());
        assert_eq!(cache.get(&(1, "steve".into())), Some("a".into()));

        assert_eq!(cache.entry_count(), 2);

        cache.invalidate_all();
        assert_eq!(cache.get(&(1, "steve".into())), None);
        assert_eq!(cache.entry_count(), 0);
    }

    #[test]
    fn test_invalidate_where() {
        let cache: TypedCache<(u64, String), String> =
            TypedCache::new("values", CacheConfig::with_capacity(16));

        cache.insert((1, "steve".into()), "a".into());
        cache.insert((1, "alex".into()), "b".into());
        cache.insert((2, "steve".into()), "c".into());

        cache.invalidate_where(|key, _| key.0 == 1);

        assert_eq!(cache.get(&(1, "steve".into())), None);
        assert_eq!(cache.get(&(1, "alex".into())), None);
        assert_eq!(cache.get(&(2, "steve".into())), Some("c".into()));
    }
}
