use std::future::Future;

use tracing::Instrument;

use super::{CacheEntry, CacheKey, KeyLocks, MemoryStore, PopulateError};

/// An in-memory cache which deduplicates concurrent lookups of the same key.
///
/// Transparently performs cache lookups and, on a miss, runs a caller-supplied producer exactly
/// once per key. Concurrent callers for the same key wait for that single computation and observe
/// its result. Both positive and negative results are cached; producer failures are not.
pub struct Cacher<T> {
    name: &'static str,

    /// Settled results of previous computations.
    store: MemoryStore<T>,

    /// Serializes computations of the same key.
    locks: KeyLocks,
}

impl<T> std::fmt::Debug for Cacher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cacher")
            .field("name", &self.name)
            .field("store", &self.store)
            .field("contended keys", &self.locks.len())
            .finish()
    }
}

impl<T> Clone for Cacher<T> {
    fn clone(&self) -> Self {
        Cacher {
            name: self.name,
            store: self.store.clone(),
            locks: self.locks.clone(),
        }
    }
}

impl<T> Cacher<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            store: MemoryStore::new(name),
            locks: KeyLocks::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the underlying store of settled results.
    pub fn store(&self) -> &MemoryStore<T> {
        &self.store
    }

    /// Returns the per-key locks guarding computations.
    pub fn locks(&self) -> &KeyLocks {
        &self.locks
    }

    /// Looks up the cached entry for `source` without computing anything.
    pub fn get(&self, source: &str) -> Option<CacheEntry<T>> {
        self.store.get(&CacheKey::from_url(source))
    }

    /// Removes the cached entry for `source`, so the next lookup will compute it again.
    pub fn remove(&self, source: &str) {
        self.store.remove(&CacheKey::from_url(source));
    }

    pub fn clear(&self) {
        self.store.clear();
    }

    /// Returns the cached value for `source`, or computes it with `producer`.
    ///
    /// The computation is deduplicated between concurrent requests for the same key: only the
    /// first caller to acquire the key lock invokes `producer`, all others observe its result once
    /// the lock is released. Which caller that is is unspecified.
    ///
    /// The producer receives `source` unchanged. Its result is cached when it succeeds, including
    /// `None`, which is cached as a negative entry.
    ///
    /// The producer runs in a separate task that holds the key lock. Cancelling the call does not
    /// cancel the producer, so other callers waiting for the same key still observe its result.
    ///
    /// # Errors
    ///
    /// If the producer fails, nothing is cached and the error is returned as
    /// [`PopulateError::Producer`]. The next call for the same key will invoke a producer again.
    ///
    /// # Panics
    ///
    /// A panic inside the producer is propagated to the caller, after the key lock was released.
    pub async fn get_or_populate<F, Fut, E>(
        &self,
        source: &str,
        producer: F,
    ) -> Result<Option<T>, PopulateError<E>>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<Option<T>, E>> + Send + 'static,
        E: Send + 'static,
    {
        let name = self.name;
        metric!(counter("caches.access") += 1, "cache" => name);

        let key = CacheKey::from_url(source);
        if let Some(entry) = self.store.get(&key) {
            metric!(counter("caches.memory.hit") += 1, "cache" => name);
            return Ok(entry.into_option());
        }

        let guard = self.locks.lock(key.clone()).await;

        // Somebody else might have computed this while we were waiting for the lock.
        if let Some(entry) = self.store.get(&key) {
            metric!(counter("caches.memory.hit") += 1, "cache" => name);
            tracing::trace!(cache = name, key = %key, "Found entry computed concurrently");
            return Ok(entry.into_option());
        }

        metric!(counter("caches.computation") += 1, "cache" => name);
        tracing::trace!(cache = name, key = %key, "Computing cache entry");

        let store = self.store.clone();
        let computation = producer(source.to_owned());
        let task = async move {
            let _guard = guard; // move into the future

            let result = computation.await;
            match &result {
                Ok(value) => store.insert(key, CacheEntry::from(value.clone())),
                Err(_) => {
                    metric!(counter("caches.computation.failed") += 1, "cache" => name);
                    tracing::debug!(cache = name, key = %key, "Not caching failed computation");
                }
            }
            result
        };

        match tokio::spawn(task.in_current_span()).await {
            Ok(result) => result.map_err(PopulateError::Producer),
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(err) => {
                tracing::error!(
                    error = &err as &dyn std::error::Error,
                    cache = name,
                    "Cache computation was interrupted"
                );
                Err(PopulateError::Interrupted)
            }
        }
    }
}
