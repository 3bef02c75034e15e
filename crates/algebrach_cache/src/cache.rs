//! TTL cache implementation.

use derive_getters::Getters;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cache entry with value and expiration.
#[derive(Debug, Clone, Getters)]
pub struct CacheEntry<V> {
    value: V,
    created_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            ttl,
        }
    }

    /// Check if this entry is expired.
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }

    /// Get remaining time until expiration.
    pub fn time_remaining(&self) -> Option<Duration> {
        self.ttl.checked_sub(self.created_at.elapsed())
    }
}

/// Configuration for a [`TtlCache`].
#[derive(Debug, Clone, Serialize, Deserialize, Getters, derive_setters::Setters, derive_builder::Builder)]
#[setters(prefix = "with_")]
pub struct CacheConfig {
    /// Lifetime of an entry (milliseconds)
    #[serde(default = "default_ttl_ms")]
    #[builder(default = "default_ttl_ms()")]
    ttl_ms: u64,

    /// Maximum cache size (number of entries)
    #[serde(default = "default_max_size")]
    #[builder(default = "default_max_size()")]
    max_size: usize,

    /// Whether caching is enabled
    #[serde(default = "default_enabled")]
    #[builder(default = "default_enabled()")]
    enabled: bool,
}

fn default_ttl_ms() -> u64 {
    300_000 // 5 minutes
}

fn default_max_size() -> usize {
    64
}

fn default_enabled() -> bool {
    true
}

impl CacheConfig {
    /// Entry lifetime as a `Duration`.
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl_ms(),
            max_size: default_max_size(),
            enabled: default_enabled(),
        }
    }
}

/// Shared, expiring cache of read results.
///
/// One entry per key, shared by every caller. Entries are never served past
/// their TTL. [`TtlCache::get_or_try_fetch`] fills a missing key with a single
/// fetch even when many callers miss at once: the first caller fetches while
/// the rest wait for its result.
///
/// # Example
///
/// ```
/// use algebrach_cache::{CacheConfig, TtlCache};
///
/// let cache: TtlCache<&'static str, Vec<u32>> = TtlCache::new(CacheConfig::default());
/// cache.insert("records", vec![1, 2, 3]);
/// assert_eq!(cache.get(&"records"), Some(vec![1, 2, 3]));
/// ```
pub struct TtlCache<K, V> {
    config: CacheConfig,
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    fill_locks: Mutex<HashMap<K, Arc<tokio::sync::Mutex<()>>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    /// Create a new cache with configuration.
    pub fn new(config: CacheConfig) -> Self {
        tracing::debug!(
            ttl_ms = config.ttl_ms,
            max_size = config.max_size,
            enabled = config.enabled,
            "Creating new TtlCache"
        );
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
            fill_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Store `value` under `key` with the configured TTL.
    pub fn insert(&self, key: K, value: V) {
        self.insert_with_ttl(key, value, self.config.ttl());
    }

    /// Store `value` under `key` with an explicit TTL.
    #[tracing::instrument(skip(self, value), fields(cache_size))]
    pub fn insert_with_ttl(&self, key: K, value: V, ttl: Duration) {
        if !self.config.enabled {
            tracing::debug!("Cache disabled, skipping insert");
            return;
        }

        let mut entries = self.entries.lock();
        if entries.len() >= self.config.max_size && !entries.contains_key(&key) {
            Self::evict_oldest(&mut entries);
        }
        entries.insert(key, CacheEntry::new(value, ttl));
        tracing::Span::current().record("cache_size", entries.len());
        tracing::debug!(ttl = ?ttl, "Inserted entry into cache");
    }

    /// Get an unexpired value.
    ///
    /// Expired entries are removed on the way out.
    pub fn get(&self, key: &K) -> Option<V> {
        if !self.config.enabled {
            return None;
        }

        let mut entries = self.entries.lock();
        let entry = entries.get(key)?;
        if entry.is_expired() {
            tracing::debug!(?key, "Cache entry expired, removing");
            entries.remove(key);
            return None;
        }

        tracing::debug!(?key, time_remaining = ?entry.time_remaining(), "Cache hit");
        Some(entry.value.clone())
    }

    /// Return the cached value for `key`, or run `fetch` and cache its output.
    ///
    /// Concurrent misses on the same key share one `fetch`. Errors are
    /// returned to the caller that fetched and are not cached; a waiting
    /// caller then runs its own `fetch`.
    pub async fn get_or_try_fetch<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        if !self.config.enabled {
            return fetch().await;
        }

        let fill_lock = Arc::clone(
            self.fill_locks
                .lock()
                .entry(key.clone())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        );
        let _filling = fill_lock.lock().await;

        if let Some(value) = self.get(&key) {
            tracing::debug!(?key, "Filled by a concurrent caller");
            return Ok(value);
        }

        tracing::debug!(?key, "Cache miss, fetching");
        let value = fetch().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Drop the entry for `key`, if any.
    pub fn invalidate(&self, key: &K) {
        self.entries.lock().remove(key);
    }

    /// Remove expired entries from cache.
    pub fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        let removed = before - entries.len();
        if removed > 0 {
            tracing::info!(removed, remaining = entries.len(), "Cleaned up expired cache entries");
        }
        removed
    }

    /// Clear all cache entries.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        let count = entries.len();
        entries.clear();
        tracing::info!(cleared = count, "Cleared cache");
    }

    /// Get number of cached entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn evict_oldest(entries: &mut HashMap<K, CacheEntry<V>>) {
        let oldest = entries
            .iter()
            .min_by_key(|(_, entry)| entry.created_at)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            tracing::debug!(?key, "Evicting oldest entry");
            entries.remove(&key);
        }
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
