//! TTL- and calendar-date-aware forecast cache.
//!
//! A cached value goes stale when its TTL passes *or* when the local date
//! moves past the date it was fetched on: "today's" weather stops being
//! today's at midnight even if the TTL has time left. Stale values are still
//! returned (as [`CacheLookup::HitStale`]) so callers can fall back to them
//! when a refresh fails.
//!
//! Entries are JSON-encoded under a namespace prefix inside a shared
//! [`KeyValueStore`]. A payload that fails to decode is evicted and reported
//! as a miss; store read failures also degrade to a miss.
//!
//! Reads, writes and removals each have a `*_with_cancel` form taking a
//! [`CancelFlag`]. A tripped flag aborts the store call with
//! [`CacheError::Cancelled`] and leaves the stored entry as it was.

pub mod cancel;
pub mod store;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

use crate::constants::{DEFAULT_CACHE_TTL_MINUTES, FORECAST_CACHE_NAMESPACE};
use crate::time_source::TimeSource;

pub use cancel::CancelFlag;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to encode cache entry: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("cache operation cancelled")]
    Cancelled,
}

/// A stored value with its freshness metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub value: T,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Local calendar date the value was fetched on.
    pub generation_date: NaiveDate,
}

impl<T> CacheEntry<T> {
    pub fn is_stale(&self, now: DateTime<Utc>, today: NaiveDate) -> bool {
        now > self.expires_at || self.generation_date != today
    }
}

/// Outcome of a cache read.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<T> {
    Miss,
    HitFresh(T),
    HitStale(T),
}

impl<T> CacheLookup<T> {
    pub fn is_fresh(&self) -> bool {
        matches!(self, CacheLookup::HitFresh(_))
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, CacheLookup::Miss)
    }

    /// The cached value regardless of freshness.
    pub fn into_value(self) -> Option<T> {
        match self {
            CacheLookup::Miss => None,
            CacheLookup::HitFresh(value) | CacheLookup::HitStale(value) => Some(value),
        }
    }
}

/// Typed cache over a shared blob store.
pub struct ForecastCache<T, S: KeyValueStore> {
    store: Arc<S>,
    namespace: String,
    default_ttl: Duration,
    clock: Arc<dyn TimeSource>,
    _value: PhantomData<fn() -> T>,
}

impl<T, S> ForecastCache<T, S>
where
    T: Serialize + DeserializeOwned,
    S: KeyValueStore,
{
    /// Cache using the default namespace, a 2 hour TTL and the global clock.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            namespace: FORECAST_CACHE_NAMESPACE.to_string(),
            default_ttl: Duration::minutes(DEFAULT_CACHE_TTL_MINUTES as i64),
            clock: crate::time_source::shared(),
            _value: PhantomData,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_time_source(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    fn store_key(&self, key: &str) -> String {
        format!("{}{key}", self.namespace)
    }

    /// Look up `key`, classifying the result as fresh, stale or missing.
    pub fn get(&self, key: &str) -> CacheLookup<T> {
        self.lookup(key, None).unwrap_or(CacheLookup::Miss)
    }

    /// Like [`get`](Self::get), but gives up with [`CacheError::Cancelled`]
    /// once `cancel` trips. Other store failures still read as a miss.
    pub fn get_with_cancel(
        &self,
        key: &str,
        cancel: &CancelFlag,
    ) -> Result<CacheLookup<T>, CacheError> {
        self.lookup(key, Some(cancel))
    }

    fn lookup(&self, key: &str, cancel: Option<&CancelFlag>) -> Result<CacheLookup<T>, CacheError> {
        let store_key = self.store_key(key);

        let read = match cancel {
            Some(cancel) => self.store.get_cancellable(&store_key, cancel),
            None => self.store.get(&store_key),
        };
        let blob = match read {
            Ok(Some(blob)) => blob,
            Ok(None) => return Ok(CacheLookup::Miss),
            Err(StoreError::Cancelled) => return Err(CacheError::Cancelled),
            Err(e) => {
                log_warning!("Cache read failed for '{}': {}", key, e);
                return Ok(CacheLookup::Miss);
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_slice(&blob) {
            Ok(entry) => entry,
            Err(e) => {
                log_warning!("Discarding unreadable cache entry '{}': {}", key, e);
                let evicted = match cancel {
                    Some(cancel) => self.store.remove_cancellable(&store_key, cancel),
                    None => self.store.remove(&store_key),
                };
                match evicted {
                    Ok(()) => {}
                    Err(StoreError::Cancelled) => return Err(CacheError::Cancelled),
                    Err(e) => log_warning!("Failed to evict cache entry '{}': {}", key, e),
                }
                return Ok(CacheLookup::Miss);
            }
        };

        let now = self.clock.now();
        if entry.is_stale(now.with_timezone(&Utc), now.date_naive()) {
            Ok(CacheLookup::HitStale(entry.value))
        } else {
            Ok(CacheLookup::HitFresh(entry.value))
        }
    }

    /// Read the full entry with its metadata, without freshness classification.
    pub fn entry(&self, key: &str) -> Option<CacheEntry<T>> {
        let blob = self.store.get(&self.store_key(key)).ok().flatten()?;
        serde_json::from_slice(&blob).ok()
    }

    /// Store `value` with the default TTL.
    pub fn set(&self, key: &str, value: T) -> Result<(), CacheError> {
        self.set_with_ttl(key, value, self.default_ttl)
    }

    /// Store `value`, overwriting any existing entry.
    pub fn set_with_ttl(&self, key: &str, value: T, ttl: Duration) -> Result<(), CacheError> {
        let blob = self.encode(value, ttl)?;
        self.store.set(&self.store_key(key), &blob)?;
        Ok(())
    }

    /// Like [`set_with_ttl`](Self::set_with_ttl) but abandons the write if
    /// `cancel` trips before it is committed. A cancelled write leaves the
    /// previous entry, if any, in place.
    pub fn set_with_cancel(
        &self,
        key: &str,
        value: T,
        ttl: Duration,
        cancel: &CancelFlag,
    ) -> Result<(), CacheError> {
        if cancel.is_cancelled() {
            return Err(CacheError::Cancelled);
        }
        let blob = self.encode(value, ttl)?;
        match self.store.set_cancellable(&self.store_key(key), &blob, cancel) {
            Ok(()) => Ok(()),
            Err(StoreError::Cancelled) => Err(CacheError::Cancelled),
            Err(e) => Err(e.into()),
        }
    }

    fn encode(&self, value: T, ttl: Duration) -> Result<Vec<u8>, CacheError> {
        let now = self.clock.now();
        let fetched_at = now.with_timezone(&Utc);
        let entry = CacheEntry {
            value,
            fetched_at,
            expires_at: fetched_at + ttl,
            generation_date: now.date_naive(),
        };
        Ok(serde_json::to_vec(&entry)?)
    }

    pub fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.store.remove(&self.store_key(key))?;
        Ok(())
    }

    /// Remove `key` unless `cancel` trips first.
    pub fn remove_with_cancel(&self, key: &str, cancel: &CancelFlag) -> Result<(), CacheError> {
        match self.store.remove_cancellable(&self.store_key(key), cancel) {
            Ok(()) => Ok(()),
            Err(StoreError::Cancelled) => Err(CacheError::Cancelled),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove every entry under this cache's namespace. Foreign keys sharing
    /// the store are left alone. Returns the number of entries removed.
    pub fn clear(&self) -> Result<usize, CacheError> {
        let ours: Vec<String> = self
            .store
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(&self.namespace))
            .collect();

        for key in &ours {
            self.store.remove(key)?;
        }
        Ok(ours.len())
    }
}
