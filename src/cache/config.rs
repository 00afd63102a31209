//! Cache configuration and per-category TTL defaults.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Configuration for a cache instance.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries in the cache.
    pub max_capacity: u64,

    /// Default time-to-live for entries inserted without an explicit TTL.
    pub ttl: Option<Duration>,

    /// Time-to-idle for cache entries.
    /// Entries are evicted if not accessed within this duration.
    pub tti: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            ttl: Some(CacheCategory::Default.default_ttl()),
            tti: None,
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with the given max capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            max_capacity,
            ..Default::default()
        }
    }

    /// Set max capacity for cache (builder pattern).
    #[must_use]
    pub fn max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Set time-to-live for cache entries.
    #[must_use]
    pub fn ttl(mut self, duration: Duration) -> Self {
        self.ttl = Some(duration);
        self
    }

    /// Set time-to-idle for cache entries.
    #[must_use]
    pub fn tti(mut self, duration: Duration) -> Self {
        self.tti = Some(duration);
        self
    }
}

/// Cache bucket an entity's reads land in.
///
/// Each category owns its own cache and TTL: data that changes often
/// (messages) expires quickly, rarely edited data (users, beneficiaries)
/// stays around longer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheCategory {
    Beneficiaries,
    Donations,
    Tasks,
    Todos,
    Users,
    Meetings,
    Messages,
    Default,
}

impl CacheCategory {
    pub const ALL: [CacheCategory; 8] = [
        CacheCategory::Beneficiaries,
        CacheCategory::Donations,
        CacheCategory::Tasks,
        CacheCategory::Todos,
        CacheCategory::Users,
        CacheCategory::Meetings,
        CacheCategory::Messages,
        CacheCategory::Default,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beneficiaries => "beneficiaries",
            Self::Donations => "donations",
            Self::Tasks => "tasks",
            Self::Todos => "todos",
            Self::Users => "users",
            Self::Meetings => "meetings",
            Self::Messages => "messages",
            Self::Default => "default",
        }
    }

    /// Built-in TTL for the category.
    pub fn default_ttl(&self) -> Duration {
        let minutes = match self {
            Self::Messages => 1,
            Self::Tasks | Self::Todos | Self::Default => 2,
            Self::Donations | Self::Meetings => 10,
            Self::Beneficiaries => 15,
            Self::Users => 20,
        };
        Duration::from_secs(minutes * 60)
    }
}

impl fmt::Display for CacheCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| format!("unknown cache category: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_ttls() {
        assert_eq!(CacheCategory::Messages.default_ttl(), Duration::from_secs(60));
        assert_eq!(CacheCategory::Tasks.default_ttl(), Duration::from_secs(120));
        assert_eq!(CacheCategory::Donations.default_ttl(), Duration::from_secs(600));
        assert_eq!(CacheCategory::Beneficiaries.default_ttl(), Duration::from_secs(900));
        assert_eq!(CacheCategory::Users.default_ttl(), Duration::from_secs(1200));
        assert_eq!(CacheCategory::Default.default_ttl(), Duration::from_secs(120));
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("USERS".parse::<CacheCategory>(), Ok(CacheCategory::Users));
        assert!("widgets".parse::<CacheCategory>().is_err());
    }
}
