use super::{CacheEntry, CacheKey};

type InMemoryCache<T> = moka::sync::Cache<CacheKey, CacheEntry<T>>;

/// The settled results of previous lookups, shared process-wide.
///
/// Reads never wait for a running computation, they only observe what has been inserted so far.
/// Writers to the same key are expected to be serialized by [`KeyLocks`](super::KeyLocks).
///
/// The store is unbounded and entries never expire, they only go away when removed explicitly.
pub struct MemoryStore<T> {
    cache: InMemoryCache<T>,
}

impl<T> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
        }
    }
}

impl<T> std::fmt::Debug for MemoryStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl<T> MemoryStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(name: &str) -> Self {
        let cache = InMemoryCache::builder().name(name).build();
        Self { cache }
    }

    /// Returns the entry for `key`, or `None` if it was never populated.
    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry<T>> {
        self.cache.get(key)
    }

    /// Inserts a positive or negative entry, replacing whatever was cached before.
    pub fn insert(&self, key: CacheKey, entry: CacheEntry<T>) {
        self.cache.insert(key, entry);
    }

    pub fn remove(&self, key: &CacheKey) {
        self.cache.invalidate(key);
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    /// The approximate number of entries.
    ///
    /// This might lag behind recent inserts and removals.
    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_is_idempotent() {
        let store = MemoryStore::new("test");
        let key = CacheKey::from_url("https://vimeo.com/1");

        assert_eq!(store.get(&key), None);

        store.insert(key.clone(), CacheEntry::Found("video".to_owned()));
        for _ in 0..3 {
            assert_eq!(store.get(&key), Some(CacheEntry::Found("video".to_owned())));
        }
        assert_eq!(store.entry_count(), 1);
    }

    #[test]
    fn test_negative_entry() {
        let store = MemoryStore::<String>::new("test");
        let key = CacheKey::from_url("https://vimeo.com/1");

        store.insert(key.clone(), CacheEntry::NotFound);
        let entry = store.get(&key).unwrap();
        assert!(entry.is_negative());
        assert_eq!(entry.into_option(), None);
    }

    #[test]
    fn test_overwrite_and_invalidate() {
        let store = MemoryStore::new("test");
        let one = CacheKey::from_url("https://vimeo.com/1");
        let two = CacheKey::from_url("https://vimeo.com/2");

        store.insert(one.clone(), CacheEntry::NotFound);
        store.insert(one.clone(), CacheEntry::Found(1));
        store.insert(two.clone(), CacheEntry::Found(2));
        assert_eq!(store.get(&one), Some(CacheEntry::Found(1)));

        store.remove(&one);
        assert_eq!(store.get(&one), None);
        assert_eq!(store.get(&two), Some(CacheEntry::Found(2)));

        store.clear();
        assert_eq!(store.get(&two), None);
    }
}
