use std::error::Error;
use std::fmt;

/// An entry in the in-memory cache.
///
/// Negative results are cached as well, so that a resource which does not exist upstream is not
/// requested over and over again. An entry that is missing from the cache altogether means that
/// the resource was never looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEntry<T> {
    /// The producer returned a value.
    Found(T),
    /// The producer completed, but there is no value for this key.
    NotFound,
}

impl<T> CacheEntry<T> {
    /// Returns `true` for a negative cache entry.
    pub fn is_negative(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Converts this entry into the value the producer returned.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }
}

impl<T> From<Option<T>> for CacheEntry<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Found(value),
            None => Self::NotFound,
        }
    }
}

/// An error that happens while populating a cache entry.
///
/// Neither variant is ever persisted in the cache.
#[derive(Debug)]
pub enum PopulateError<E> {
    /// The producer itself failed.
    Producer(E),
    /// The producer task was torn down before it completed, which only happens when the runtime
    /// is shutting down.
    Interrupted,
}

impl<E: fmt::Display> fmt::Display for PopulateError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Producer(err) => write!(f, "failed to produce cache entry: {err}"),
            Self::Interrupted => f.write_str("cache computation was interrupted"),
        }
    }
}

impl<E: Error + 'static> Error for PopulateError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Producer(err) => Some(err),
            Self::Interrupted => None,
        }
    }
}
