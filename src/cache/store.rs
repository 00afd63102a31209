//! Response caching seam used by the request dispatcher.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use super::{CacheCategory, CacheRegistry};

/// Failures inside a cache implementation.
///
/// Callers treat any of these as a miss; they are logged, never surfaced.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache '{name}' holds {found}, requested {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Storage for raw response envelopes, partitioned by category.
pub trait ResponseStore: Send + Sync {
    /// TTL for entries written under `category`.
    fn ttl_for(&self, category: CacheCategory) -> Duration;

    /// Look up a live entry.
    fn lookup(&self, category: CacheCategory, key: &str) -> Result<Option<Value>, CacheError>;

    /// Store (or overwrite) an entry that expires after `ttl`.
    fn store(&self, category: CacheCategory, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError>;

    /// Drop every entry in `category` whose key starts with `prefix`.
    fn invalidate_prefix(&self, category: CacheCategory, prefix: &str) -> Result<(), CacheError>;
}

impl ResponseStore for CacheRegistry {
    fn ttl_for(&self, category: CacheCategory) -> Duration {
        CacheRegistry::ttl_for(self, category)
    }

    fn lookup(&self, category: CacheCategory, key: &str) -> Result<Option<Value>, CacheError> {
        Ok(self.category::<Value>(category)?.get(&key.to_string()))
    }

    fn store(&self, category: CacheCategory, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError> {
        self.category::<Value>(category)?
            .insert_with_ttl(key.to_string(), value, ttl);
        Ok(())
    }

    fn invalidate_prefix(&self, category: CacheCategory, prefix: &str) -> Result<(), CacheError> {
        self.category::<Value>(category)?.invalidate_prefix(prefix)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::cache::{CacheConfig, ManualClock};

    #[test]
    fn test_registry_store_roundtrip_and_expiry() {
        let clock = Arc::new(ManualClock::default());
        let registry = CacheRegistry::with_clock(clock.clone());
        let ttl = registry.ttl_for(CacheCategory::Messages);

        registry
            .store(CacheCategory::Messages, "messages:", json!({"success": true}), ttl)
            .unwrap();
        assert!(registry.lookup(CacheCategory::Messages, "messages:").unwrap().is_some());

        clock.advance(ttl);
        assert!(registry.lookup(CacheCategory::Messages, "messages:").unwrap().is_none());
    }

    #[test]
    fn test_categories_are_isolated() {
        let registry = CacheRegistry::new();
        let ttl = Duration::from_secs(60);
        registry
            .store(CacheCategory::Tasks, "tasks:1", json!(1), ttl)
            .unwrap();

        assert!(registry.lookup(CacheCategory::Todos, "tasks:1").unwrap().is_none());
    }

    #[test]
    fn test_conflicting_cache_name_surfaces_error() {
        let registry = CacheRegistry::new();
        registry
            .create::<u64, u64>("users", CacheConfig::default())
            .unwrap();

        assert!(registry.lookup(CacheCategory::Users, "users:1").is_err());
    }
}
