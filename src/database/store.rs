//! Document database holding one collection per entity.

use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tracing::info;

use super::collection::Collection;
use super::schema::{COLLECTIONS, CollectionSpec};

/// Document store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {id} not found in {collection}")]
    NotFound { collection: String, id: String },

    #[error("duplicate value for unique field {field} in {collection}")]
    Duplicate { collection: String, field: String },

    #[error("document does not fit {collection}: {reason}")]
    Malformed { collection: String, reason: String },

    #[error("unknown collection: {0}")]
    UnknownCollection(String),
}

/// In-memory document database.
///
/// Cloning is cheap; clones share the same collections.
#[derive(Debug, Clone)]
pub struct Database {
    collections: Arc<DashMap<&'static str, Arc<Collection>>>,
}

impl Database {
    /// A database with every entity collection registered.
    pub fn new() -> Self {
        Self::with_collections(COLLECTIONS)
    }

    pub fn with_collections(specs: impl IntoIterator<Item = CollectionSpec>) -> Self {
        let collections = DashMap::new();
        for spec in specs {
            collections.insert(spec.name, Arc::new(Collection::new(spec)));
        }
        info!("Document store ready with {} collections", collections.len());
        Self {
            collections: Arc::new(collections),
        }
    }

    /// Get a collection by name.
    pub fn collection(&self, name: &str) -> Result<Arc<Collection>, StoreError> {
        self.collections
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| StoreError::UnknownCollection(name.to_string()))
    }

    pub fn collection_names(&self) -> Vec<&'static str> {
        self.collections.iter().map(|entry| *entry.key()).collect()
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}
