//! Cache Factory Module
//!
//! Builds a shared engine from configuration, restoring a snapshot when one
//! is present on disk.

use std::hash::Hash;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::cache::{Policy, SharedCache, DEFAULT_CAPACITY};
use crate::error::Result;

// == Cache Config ==
/// Parameters needed to build (or restore) an engine.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Eviction strategy
    pub policy: Policy,
    /// Maximum number of entries, None or 0 = unbounded
    pub capacity: Option<usize>,
    /// Snapshot file loaded on open and written on persist
    pub snapshot_path: Option<PathBuf>,
    /// Whether the snapshot file is zlib-compressed
    pub compressed: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            policy: Policy::default(),
            capacity: Some(DEFAULT_CAPACITY),
            snapshot_path: None,
            compressed: true,
        }
    }
}

// == Open ==
/// Builds a thread-safe engine for `config`.
///
/// When `snapshot_path` names an existing file, the engine is restored from
/// it; a corrupt file fails with `CorruptCacheData` rather than silently
/// starting empty.
pub fn open_cache<K, V>(config: &CacheConfig) -> Result<SharedCache<K, V>>
where
    K: Eq + Hash + Clone + DeserializeOwned,
    V: Clone + DeserializeOwned,
{
    match config.snapshot_path.as_deref() {
        Some(path) if path.exists() => SharedCache::load_from_path(
            config.policy,
            config.capacity,
            path,
            config.compressed,
        ),
        _ => {
            info!(
                policy = %config.policy,
                capacity = ?config.capacity,
                "Starting with an empty cache"
            );
            Ok(SharedCache::new(config.policy, config.capacity))
        }
    }
}

// == Persist ==
/// Saves `cache` to the configured snapshot path.
///
/// Returns false when no path is configured.
pub fn persist_cache<K, V>(cache: &SharedCache<K, V>, config: &CacheConfig) -> Result<bool>
where
    K: Eq + Hash + Clone + Serialize,
    V: Clone + Serialize,
{
    let Some(path) = config.snapshot_path.as_deref() else {
        return Ok(false);
    };
    cache.save_to_path(path, config.compressed)?;
    Ok(true)
}
