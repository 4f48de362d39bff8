use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::CacheKey;

#[derive(Debug, Default)]
struct LockEntry {
    lock: Arc<AsyncMutex<()>>,
    /// The number of callers currently holding or waiting for `lock`.
    users: usize,
}

type LockTable = Arc<Mutex<HashMap<CacheKey, LockEntry>>>;

fn lock_table(
    table: &Mutex<HashMap<CacheKey, LockEntry>>,
) -> MutexGuard<'_, HashMap<CacheKey, LockEntry>> {
    // The table is consistent after every single statement, so a poisoned lock is still usable.
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Per-key mutual exclusion.
///
/// Callers locking the same [`CacheKey`] are serialized, while callers locking different keys
/// never wait on each other. Waiting is asynchronous and only suspends the waiting task.
///
/// Locks are created lazily and removed as soon as nobody holds or waits for them anymore, so the
/// table only ever contains keys that are currently contended. Which of several concurrent
/// waiters acquires a lock first is unspecified.
#[derive(Clone, Debug, Default)]
pub struct KeyLocks {
    locks: LockTable,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for `key`, waiting for the current holder to release it.
    ///
    /// The lock is released when the returned [`KeyLockGuard`] is dropped. Dropping the returned
    /// future before it completes abandons the wait without affecting other callers.
    pub async fn lock(&self, key: CacheKey) -> KeyLockGuard {
        let registration = Registration::new(&self.locks, key);
        let guard = Arc::clone(&registration.lock).lock_owned().await;

        KeyLockGuard {
            _guard: guard,
            registration,
        }
    }

    /// Runs `body` while holding the lock for `key`.
    pub async fn with_lock<F, T>(&self, key: CacheKey, body: F) -> T
    where
        F: Future<Output = T>,
    {
        let _guard = self.lock(key).await;
        body.await
    }

    /// Returns the number of keys that are currently locked or waited for.
    pub fn len(&self) -> usize {
        lock_table(&self.locks).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bookkeeping for one caller holding or waiting for a key lock.
///
/// Registering and unregistering both happen under the table lock, which makes the lazy creation
/// of a key lock and its removal race-free.
#[derive(Debug)]
struct Registration {
    key: CacheKey,
    lock: Arc<AsyncMutex<()>>,
    locks: LockTable,
}

impl Registration {
    fn new(locks: &LockTable, key: CacheKey) -> Self {
        let lock = {
            let mut table = lock_table(locks);
            let entry = table.entry(key.clone()).or_default();
            entry.users += 1;
            Arc::clone(&entry.lock)
        };

        Self {
            key,
            lock,
            locks: Arc::clone(locks),
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        let mut table = lock_table(&self.locks);
        if let Some(entry) = table.get_mut(&self.key) {
            entry.users -= 1;
            if entry.users == 0 {
                table.remove(&self.key);
            }
        }
    }
}

/// Holds the lock for one [`CacheKey`] until dropped.
#[derive(Debug)]
pub struct KeyLockGuard {
    // NOTE: Fields are dropped in declaration order, the lock has to be released first.
    _guard: OwnedMutexGuard<()>,
    registration: Registration,
}

impl KeyLockGuard {
    /// The key this guard is holding the lock for.
    pub fn key(&self) -> &CacheKey {
        &self.registration.key
    }
}
