//! Configuration module.
//!
//! Loads configuration from environment variables (and `.env`).

use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::cache::{CacheCategory, CacheRegistry, Clock};
use crate::utils::parse_duration;

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid {expected}: {value:?}")]
    Invalid {
        var: String,
        expected: &'static str,
        value: String,
    },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the reference API server binds to.
    pub server_addr: SocketAddr,

    /// Base URL the HTTP transport resolves `/api/...` endpoints against.
    pub api_base_url: String,

    /// Timeout applied to every outgoing HTTP request.
    pub request_timeout: Duration,

    /// Locale for server messages when the request names none.
    pub default_locale: String,

    /// Entry bound for each category cache.
    pub cache_max_capacity: u64,

    /// Per-category TTL overrides (`CACHE_TTL_<CATEGORY>`).
    pub cache_ttl_overrides: HashMap<CacheCategory, Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            api_base_url: "http://localhost:3000".to_string(),
            request_timeout: Duration::from_secs(30),
            default_locale: "tr".to_string(),
            cache_max_capacity: 10_000,
            cache_ttl_overrides: HashMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable is optional; defaults match [`Config::default`].
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let server_addr = match lookup("SERVER_ADDR") {
            Some(raw) => raw.trim().parse().map_err(|_| invalid("SERVER_ADDR", "socket address", &raw))?,
            None => defaults.server_addr,
        };

        let api_base_url = match lookup("API_BASE_URL") {
            Some(raw) => {
                url::Url::parse(raw.trim()).map_err(|_| invalid("API_BASE_URL", "URL", &raw))?;
                raw.trim().trim_end_matches('/').to_string()
            }
            None => defaults.api_base_url,
        };

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .map_err(|_| invalid("REQUEST_TIMEOUT_SECS", "number of seconds", &raw))?,
            ),
            None => defaults.request_timeout,
        };

        let default_locale = lookup("DEFAULT_LOCALE")
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.default_locale);

        let cache_max_capacity = match lookup("CACHE_MAX_CAPACITY") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| invalid("CACHE_MAX_CAPACITY", "entry count", &raw))?,
            None => defaults.cache_max_capacity,
        };

        let mut cache_ttl_overrides = HashMap::new();
        for category in CacheCategory::ALL {
            let var = format!("CACHE_TTL_{}", category.as_str().to_uppercase());
            if let Some(raw) = lookup(&var) {
                let ttl = parse_duration(&raw).ok_or_else(|| invalid(&var, "duration (e.g. 30s, 5m)", &raw))?;
                cache_ttl_overrides.insert(category, ttl);
            }
        }

        Ok(Self {
            server_addr,
            api_base_url,
            request_timeout,
            default_locale,
            cache_max_capacity,
            cache_ttl_overrides,
        })
    }

    /// Build a cache registry carrying this config's capacity and TTLs.
    pub fn cache_registry(&self, clock: Arc<dyn Clock>) -> CacheRegistry {
        self.cache_ttl_overrides.iter().fold(
            CacheRegistry::with_clock(clock).max_capacity(self.cache_max_capacity),
            |registry, (category, ttl)| registry.ttl_override(*category, *ttl),
        )
    }
}

fn invalid(var: &str, expected: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        var: var.to_string(),
        expected,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SystemClock;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.server_addr.port(), 3000);
        assert_eq!(config.api_base_url, "http://localhost:3000");
        assert_eq!(config.default_locale, "tr");
        assert!(config.cache_ttl_overrides.is_empty());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("SERVER_ADDR", "127.0.0.1:8080"),
            ("API_BASE_URL", "https://vakif.example.org/"),
            ("CACHE_TTL_MESSAGES", "30s"),
            ("DEFAULT_LOCALE", "EN"),
        ]))
        .unwrap();

        assert_eq!(config.server_addr.port(), 8080);
        assert_eq!(config.api_base_url, "https://vakif.example.org");
        assert_eq!(config.default_locale, "en");

        let registry = config.cache_registry(Arc::new(SystemClock));
        assert_eq!(registry.ttl_for(CacheCategory::Messages), Duration::from_secs(30));
        assert_eq!(registry.ttl_for(CacheCategory::Users), Duration::from_secs(1200));
    }

    #[test]
    fn test_invalid_value_names_variable() {
        let err = Config::from_lookup(lookup_from(&[("CACHE_TTL_USERS", "forever")])).unwrap_err();
        assert!(err.to_string().contains("CACHE_TTL_USERS"));
    }
}
