//! Cache Module
//!
//! Provides an in-memory key/value cache with pluggable eviction (capped,
//! LRU, LFU), lazy TTL expiration and snapshot persistence.

pub mod codec;
mod entry;
mod factory;
mod order;
mod policy;
mod shared;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use codec::{Snapshot, SnapshotRecord};
pub use entry::{CacheEntry, Usage};
pub use factory::{open_cache, persist_cache, CacheConfig};
pub use order::KeyOrder;
pub use policy::Policy;
pub use shared::SharedCache;
pub use stats::CacheStats;
pub use store::Cache;

// == Public Constants ==
/// Capacity used when none is configured
pub const DEFAULT_CAPACITY: usize = 1024;
