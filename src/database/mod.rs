//! In-memory document store backing the reference API server.

mod collection;
mod schema;
mod store;

pub use collection::{CREATED_AT_FIELD, Collection, Document, ID_FIELD, ListQuery, UPDATED_AT_FIELD};
pub use schema::{COLLECTIONS, CollectionSpec};
pub use store::{Database, StoreError};
