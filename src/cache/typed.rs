//! Typed TTL cache wrapper around Moka.

use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use moka::Expiry;
use moka::sync::Cache;

use super::clock::{Clock, SystemClock, to_chrono};
use super::{CacheConfig, CacheError};

/// TTL used when a config carries none.
const UNBOUNDED_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// A stored value with its logical expiry.
#[derive(Clone)]
struct Slot<V> {
    value: V,
    ttl: Duration,
    expires_at: DateTime<Utc>,
}

/// Lets Moka reclaim memory once a slot's own TTL has passed.
struct SlotExpiry;

impl<K, V> Expiry<K, Slot<V>> for SlotExpiry {
    fn expire_after_create(&self, _key: &K, slot: &Slot<V>, _created_at: Instant) -> Option<Duration> {
        Some(slot.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &K,
        slot: &Slot<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(slot.ttl)
    }
}

/// A typed cache with per-entry TTL.
///
/// This cache is:
/// - Thread-safe (uses Arc internally)
/// - Bounded by `max_capacity`, with optional TTI
/// - Lazily expiring: an entry whose `expires_at <= now` reads as absent
///   and is evicted on that access
/// - Clone-friendly (cloning is cheap, shares the same underlying cache)
///
/// Expiry is judged against the injected [`Clock`]; Moka's own timers only
/// bound memory use.
pub struct TypedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Cache<K, Slot<V>>>,
    name: Arc<str>,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

// Manual Clone implementation that doesn't require K: Clone, V: Clone
impl<K, V> Clone for TypedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            name: Arc::clone(&self.name),
            default_ttl: self.default_ttl,
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<K, V> TypedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a new typed cache on the system clock.
    pub fn new(name: impl Into<Arc<str>>, config: CacheConfig) -> Self {
        Self::with_clock(name, config, Arc::new(SystemClock))
    }

    /// Create a new typed cache that reads time from `clock`.
    pub fn with_clock(name: impl Into<Arc<str>>, config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let mut builder = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(SlotExpiry)
            .support_invalidation_closures();

        if let Some(tti) = config.tti {
            builder = builder.time_to_idle(tti);
        }

        Self {
            inner: Arc::new(builder.build()),
            name: name.into(),
            default_ttl: config.ttl.unwrap_or(UNBOUNDED_TTL),
            clock,
        }
    }

    /// Get the name of this cache.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert a value using the cache's default TTL.
    pub fn insert(&self, key: K, value: V) {
        self.insert_with_ttl(key, value, self.default_ttl);
    }

    /// Insert a value that expires `ttl` from now. Overwrites any existing entry.
    pub fn insert_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let expires_at = self.clock.now() + to_chrono(ttl);
        self.inner.insert(
            key,
            Slot {
                value,
                ttl,
                expires_at,
            },
        );
    }

    /// Get a value from the cache.
    ///
    /// Returns `Some(value)` only while `now < expires_at`. An expired entry
    /// is evicted on this access.
    pub fn get(&self, key: &K) -> Option<V> {
        let slot = self.inner.get(key)?;
        if slot.expires_at <= self.clock.now() {
            self.inner.invalidate(key);
            return None;
        }
        Some(slot.value)
    }

    /// Check if a live entry exists for the key.
    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Remove a key from the cache.
    pub fn invalidate(&self, key: &K) {
        self.inner.invalidate(key);
    }

    /// Remove all entries from the cache.
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Remove every entry whose key matches the predicate.
    ///
    /// Matching entries stop being visible immediately; Moka reclaims them
    /// in the background.
    pub fn invalidate_if<F>(&self, predicate: F) -> Result<(), CacheError>
    where
        F: Fn(&K) -> bool + Send + Sync + 'static,
    {
        self.inner
            .invalidate_entries_if(move |key, _| predicate(key))
            .map(|_| ())
            .map_err(|e| CacheError::Backend(format!("{}: {e}", self.name)))
    }

    /// Get the number of entries in the cache.
    ///
    /// Note: This may not be perfectly accurate due to concurrent operations
    /// and counts entries that expired but were not yet accessed.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

impl<V> TypedCache<String, V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Remove every entry whose key starts with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        let prefix = prefix.to_string();
        self.invalidate_if(move |key: &String| key.starts_with(&prefix))
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
            .field("default_ttl", &self.default_ttl)
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    fn cache_with_clock() -> (TypedCache<String, u32>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let cache = TypedCache::with_clock(
            "test",
            CacheConfig::with_capacity(100).ttl(Duration::from_secs(60)),
            clock.clone(),
        );
        (cache, clock)
    }

    #[test]
    fn test_entry_visible_until_expiry() {
        let (cache, clock) = cache_with_clock();
        cache.insert("a".to_string(), 1);

        clock.advance(Duration::from_secs(59));
        assert_eq!(cache.get(&"a".to_string()), Some(1));

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get(&"a".to_string()), None);
    }

    #[test]
    fn test_expired_entry_is_evicted_on_access() {
        let (cache, clock) = cache_with_clock();
        cache.insert_with_ttl("a".to_string(), 1, Duration::from_secs(5));
        clock.advance(Duration::from_secs(10));

        assert!(cache.get(&"a".to_string()).is_none());
        cache.inner.run_pending_tasks();
        assert_eq!(cache.entry_count(), 0);
    }

    #[test]
    fn test_overwrite_resets_expiry() {
        let (cache, clock) = cache_with_clock();
        cache.insert_with_ttl("a".to_string(), 1, Duration::from_secs(10));
        clock.advance(Duration::from_secs(8));
        cache.insert_with_ttl("a".to_string(), 2, Duration::from_secs(10));
        clock.advance(Duration::from_secs(8));

        assert_eq!(cache.get(&"a".to_string()), Some(2));
    }

    #[test]
    fn test_invalidate_prefix() {
        let (cache, _) = cache_with_clock();
        cache.insert("tasks:".to_string(), 1);
        cache.insert("tasks:42".to_string(), 2);
        cache.insert("todos:42".to_string(), 3);

        cache.invalidate_prefix("tasks:").unwrap();

        assert!(!cache.contains(&"tasks:".to_string()));
        assert!(!cache.contains(&"tasks:42".to_string()));
        assert_eq!(cache.get(&"todos:42".to_string()), Some(3));
    }
}
