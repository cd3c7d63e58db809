//! Mini Cache - In-memory key/value caches with pluggable eviction
//!
//! Provides a generic cache engine with no-eviction, LRU and LFU policies,
//! per-entry TTL, a thread-safe variant and snapshot persistence, plus an
//! HTTP server built on top of it.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::{open_cache, persist_cache, Cache, CacheConfig, Policy, SharedCache};
pub use config::Config;
pub use error::{CacheError, Result};
