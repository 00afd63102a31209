//! Cache registry - Central management for all caches.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::{debug, info};

use super::clock::{Clock, SystemClock};
use super::{CacheCategory, CacheConfig, CacheError, TypedCache};

/// Process-wide registry, created on first use.
static SHARED: Lazy<Arc<CacheRegistry>> = Lazy::new(|| Arc::new(CacheRegistry::new()));

/// Central registry for managing multiple typed caches.
///
/// Caches are created lazily by name and shared by every holder of the
/// registry. Per-category TTLs come from [`CacheCategory::default_ttl`]
/// unless overridden at construction.
///
/// ## Example
///
/// ```rust
/// use yardim::cache::{CacheConfig, CacheRegistry};
///
/// let registry = CacheRegistry::new();
/// let cache = registry
///     .get_or_create::<String, u64>("counters", CacheConfig::default())
///     .unwrap();
/// cache.insert("a".to_string(), 1);
/// assert_eq!(cache.get(&"a".to_string()), Some(1));
/// ```
#[derive(Clone)]
pub struct CacheRegistry {
    caches: Arc<RwLock<HashMap<String, CacheEntry>>>,
    clock: Arc<dyn Clock>,
    max_capacity: u64,
    ttl_overrides: HashMap<CacheCategory, Duration>,
}

/// Internal cache entry storing type-erased cache.
struct CacheEntry {
    cache: Box<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

impl CacheRegistry {
    /// Create a new empty cache registry on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a new empty registry whose caches read time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        info!("Cache registry initialized");
        Self {
            caches: Arc::new(RwLock::new(HashMap::new())),
            clock,
            max_capacity: CacheConfig::default().max_capacity,
            ttl_overrides: HashMap::new(),
        }
    }

    /// The lazily-initialized process-wide registry.
    pub fn shared() -> Arc<CacheRegistry> {
        Arc::clone(&SHARED)
    }

    /// Bound every category cache to `max_capacity` entries.
    #[must_use]
    pub fn max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Replace the TTL of a category.
    #[must_use]
    pub fn ttl_override(mut self, category: CacheCategory, ttl: Duration) -> Self {
        self.ttl_overrides.insert(category, ttl);
        self
    }

    /// TTL applied to reads cached under `category`.
    pub fn ttl_for(&self, category: CacheCategory) -> Duration {
        self.ttl_overrides
            .get(&category)
            .copied()
            .unwrap_or_else(|| category.default_ttl())
    }

    /// Cache configuration for a category.
    pub fn category_config(&self, category: CacheCategory) -> CacheConfig {
        CacheConfig::with_capacity(self.max_capacity).ttl(self.ttl_for(category))
    }

    /// Create a new typed cache and register it.
    ///
    /// Returns the existing cache when one with the same name and types is
    /// already registered, and [`CacheError::TypeMismatch`] when the name is
    /// taken by a cache of different types.
    pub fn create<K, V>(&self, name: &str, config: CacheConfig) -> Result<TypedCache<K, V>, CacheError>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let mut caches = self.caches.write();

        if let Some(existing) = caches.get(name) {
            return Self::downcast(name, existing);
        }

        debug!("Creating cache: {}", name);

        let cache = TypedCache::with_clock(name, config, Arc::clone(&self.clock));
        caches.insert(
            name.to_string(),
            CacheEntry {
                cache: Box::new(cache.clone()),
                type_id: TypeId::of::<TypedCache<K, V>>(),
                type_name: std::any::type_name::<TypedCache<K, V>>(),
            },
        );

        Ok(cache)
    }

    /// Get an existing cache by name.
    ///
    /// Returns `Ok(None)` if the cache doesn't exist.
    pub fn get<K, V>(&self, name: &str) -> Result<Option<TypedCache<K, V>>, CacheError>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let caches = self.caches.read();
        caches
            .get(name)
            .map(|entry| Self::downcast(name, entry))
            .transpose()
    }

    /// Get an existing cache or create a new one if it doesn't exist.
    pub fn get_or_create<K, V>(&self, name: &str, config: CacheConfig) -> Result<TypedCache<K, V>, CacheError>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        if let Some(cache) = self.get(name)? {
            return Ok(cache);
        }
        self.create(name, config)
    }

    /// Get (or lazily create) the cache backing a category.
    pub fn category<V>(&self, category: CacheCategory) -> Result<TypedCache<String, V>, CacheError>
    where
        V: Clone + Send + Sync + 'static,
    {
        self.get_or_create(category.as_str(), self.category_config(category))
    }

    fn downcast<K, V>(name: &str, entry: &CacheEntry) -> Result<TypedCache<K, V>, CacheError>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        if entry.type_id != TypeId::of::<TypedCache<K, V>>() {
            return Err(CacheError::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<TypedCache<K, V>>(),
                found: entry.type_name,
            });
        }
        entry
            .cache
            .downcast_ref::<TypedCache<K, V>>()
            .cloned()
            .ok_or_else(|| CacheError::Backend(format!("cache '{name}' failed to downcast")))
    }

    /// Check if a cache with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.caches.read().contains_key(name)
    }

    /// Remove a cache from the registry.
    ///
    /// Returns `true` if the cache was removed.
    pub fn remove(&self, name: &str) -> bool {
        let removed = self.caches.write().remove(name).is_some();
        if removed {
            debug!("Removed cache: {}", name);
        }
        removed
    }

    /// Get the number of registered caches.
    pub fn len(&self) -> usize {
        self.caches.read().len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.caches.read().is_empty()
    }

    /// Get a list of all registered cache names.
    pub fn cache_names(&self) -> Vec<String> {
        self.caches.read().keys().cloned().collect()
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let caches = self.caches.read();
        f.debug_struct("CacheRegistry")
            .field("cache_count", &caches.len())
            .field("cache_names", &caches.keys().collect::<Vec<_>>())
            .field("ttl_overrides", &self.ttl_overrides)
            .finish()
    }
}
