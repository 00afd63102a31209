//! Yardim - typed CRUD client layer for foundation operations management.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `cache` - Per-category TTL caching with Moka
//! - `api` - Response envelope, CSRF-aware dispatcher, per-entity CRUD clients
//! - `models` - Typed entity documents
//! - `database` - In-memory document store
//! - `server` - Reference axum API the clients talk to
//! - `i18n` - Turkish/English server messages
//! - `utils` - Utility functions

pub mod api;
pub mod cache;
pub mod config;
pub mod database;
pub mod i18n;
pub mod models;
pub mod server;
pub mod utils;
