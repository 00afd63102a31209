//! Cache module - TTL caching for API reads, built on Moka.
//!
//! ## Architecture
//!
//! The cache system follows a registry pattern:
//! - `CacheRegistry` - Central registry holding all named caches
//! - `TypedCache` - Typed wrapper with per-entry TTL and lazy expiry
//! - `CacheCategory` - The bucket (and TTL) an entity's reads belong to
//! - `ResponseStore` - The seam the request dispatcher caches through
//!
//! ## Usage
//!
//! ```rust
//! use yardim::cache::{CacheCategory, CacheRegistry};
//!
//! let registry = CacheRegistry::new();
//! let users = registry.category::<String>(CacheCategory::Users).unwrap();
//! users.insert("users:42".to_string(), "Ayşe".to_string());
//! assert!(users.contains(&"users:42".to_string()));
//! ```

mod clock;
mod config;
mod registry;
mod store;
mod typed;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheCategory, CacheConfig};
pub use registry::CacheRegistry;
pub use store::{CacheError, ResponseStore};
pub use typed::TypedCache;
