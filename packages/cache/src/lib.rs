#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory TTL cache for fetched payloads.
//!
//! An explicit cache object owned by the fetch layer — no global
//! singleton — with lifecycle tied to the application session. Expired
//! entries are evicted lazily on the next read, and concurrent misses
//! for the same key are de-duplicated so only one fetch is ever in
//! flight per key.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// One cached payload with its creation time and lifetime.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    payload: T,
    created_at: Instant,
    ttl: Duration,
}

impl<T> CacheEntry<T> {
    /// An entry is valid iff `now <= created_at + ttl`.
    fn is_valid_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) <= self.ttl
    }
}

/// Keyed TTL cache with per-key in-flight fetch de-duplication.
pub struct TtlCache<T> {
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
    locks: tokio::sync::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    default_ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    /// Creates a cache whose entries live `default_ttl` unless overridden
    /// per insert.
    #[must_use]
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            locks: tokio::sync::Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Stores a payload under the default TTL.
    ///
    /// # Panics
    ///
    /// Panics if the cache mutex is poisoned.
    pub fn insert(&self, key: impl Into<String>, payload: T) {
        self.insert_with_ttl(key, payload, self.default_ttl);
    }

    /// Stores a payload with an explicit TTL.
    ///
    /// # Panics
    ///
    /// Panics if the cache mutex is poisoned.
    pub fn insert_with_ttl(&self, key: impl Into<String>, payload: T, ttl: Duration) {
        let entry = CacheEntry {
            payload,
            created_at: Instant::now(),
            ttl,
        };
        self.entries.lock().unwrap().insert(key.into(), entry);
    }

    /// Returns the payload if present and unexpired.
    ///
    /// # Panics
    ///
    /// Panics if the cache mutex is poisoned.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<T> {
        self.get_at(key, Instant::now())
    }

    /// Validity check against an explicit clock. Expired entries are
    /// evicted on the way out.
    ///
    /// # Panics
    ///
    /// Panics if the cache mutex is poisoned.
    #[must_use]
    pub fn get_at(&self, key: &str, now: Instant) -> Option<T> {
        let mut entries = self.entries.lock().unwrap();

        match entries.get(key) {
            Some(entry) if entry.is_valid_at(now) => Some(entry.payload.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Removes an entry.
    ///
    /// # Panics
    ///
    /// Panics if the cache mutex is poisoned.
    pub fn invalidate(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    /// Returns the cached payload or runs `fetch` to populate it.
    ///
    /// Concurrent callers for the same key serialize on a per-key lock:
    /// the first runs the fetch, the rest find the fresh entry when the
    /// lock frees up. Different keys never block each other.
    ///
    /// # Errors
    ///
    /// Propagates the fetch error; nothing is cached on failure.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(payload) = self.get(key) {
            return Ok(payload);
        }

        let key_lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(
                locks
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
            )
        };

        let _guard = key_lock.lock().await;

        // Another caller may have populated the entry while we waited.
        if let Some(payload) = self.get(key) {
            self.release_lock(key, &key_lock).await;
            return Ok(payload);
        }

        log::debug!("Cache miss for {key}, fetching");
        let result = fetch().await;
        if let Ok(payload) = &result {
            self.insert(key, payload.clone());
        }
        self.release_lock(key, &key_lock).await;
        result
    }

    /// Drops a key's lock-table entry once its fetch settles, so the
    /// table only ever holds in-flight keys. The pointer check keeps a
    /// straggler from evicting a newer lock for the same key.
    async fn release_lock(&self, key: &str, key_lock: &Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        if locks
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, key_lock))
        {
            locks.remove(key);
        }
    }
}
