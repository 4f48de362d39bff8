//! # Request coalescing cache
//!
//! Every oEmbed lookup goes through an in-memory cache which guarantees that at most one upstream
//! request is in flight per resource, no matter how many callers ask for it concurrently.
//! This module contains all the pieces of that cache, and explains how they play together.
//!
//! ## [`CacheKey`]
//!
//! The [`CacheKey`] is derived from the URL of the embedded resource by [`CacheKey::from_url`].
//! It canonicalizes the URL (scheme and host case, default ports, trailing slashes), but keeps the
//! query string as is. Deriving a key never fails, unparseable input is used verbatim.
//!
//! **NOTE**: Care must be taken to keep the normalization stable, as [`CacheKey::cache_path`] is
//! meant to be usable for persistence.
//!
//! ## [`KeyLocks`]
//!
//! A table of per-key asynchronous locks. Callers for the same key are serialized, callers for
//! different keys proceed fully concurrently. Locks are created on first use and reclaimed as soon
//! as no caller holds or waits for them.
//!
//! ## [`MemoryStore`] / [`CacheEntry`]
//!
//! The store keeps the settled result of every computation, backed by an unbounded `moka` cache.
//! A [`CacheEntry`] is either [`CacheEntry::Found`] or the negative [`CacheEntry::NotFound`].
//! Negative entries are cached on purpose, so that resources which do not exist upstream are not
//! requested again and again. Entries live until they are explicitly removed.
//!
//! ## [`Cacher`]
//!
//! The entry point, [`Cacher::get_or_populate`], works like this:
//!
//! - Derive the [`CacheKey`].
//! - Acquire the lock for that key.
//! - Return the cached entry if there is one.
//! - Otherwise, run the producer, store its result and release the lock.
//!
//! Producer failures are never cached, the next lookup will retry. Retry policies are left to the
//! producer.
//!
//! ### Metrics
//!
//! Each metric is tagged with a `cache` field that corresponds to the [`Cacher::name`]:
//!
//! - `caches.access`: All accesses.
//! - `caches.memory.hit`: Accesses served from the store.
//! - `caches.computation`: Producer invocations.
//! - `caches.computation.failed`: Producer invocations that failed and were not cached.

mod cache_error;
mod cache_key;
mod key_lock;
mod memory;
mod store;

pub use cache_error::{CacheEntry, PopulateError};
pub use cache_key::CacheKey;
pub use key_lock::{KeyLockGuard, KeyLocks};
pub use memory::Cacher;
pub use store::MemoryStore;
