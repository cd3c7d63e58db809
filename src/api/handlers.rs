//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{debug, info};

use crate::cache::{codec, CacheConfig, SharedCache};
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, ClearResponse, DeleteResponse, ExistsResponse, GetResponse, HealthResponse,
    KeysResponse, SetRequest, SetResponse, SnapshotResponse, StatsResponse,
};

/// Cache type served over HTTP.
pub type ServedCache = SharedCache<String, String>;

/// Application state shared across all handlers.
///
/// The cache guards itself, so the state only needs an `Arc` around it.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache engine
    pub cache: Arc<ServedCache>,
    /// Policy, capacity and snapshot settings the cache was built from
    pub cache_config: Arc<CacheConfig>,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: ServedCache, cache_config: CacheConfig) -> Self {
        Self {
            cache: Arc::new(cache),
            cache_config: Arc::new(cache_config),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Restores the configured snapshot when the file exists.
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        let cache_config = config.cache_config();
        let cache = crate::cache::open_cache(&cache_config)?;
        Ok(Self::new(cache, cache_config))
    }
}

fn checked_key(key: String) -> Result<String> {
    match validate_key(&key) {
        Some(error_msg) => Err(CacheError::InvalidRequest(error_msg)),
        None => Ok(key),
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair. With a `ttl` the entry expires after that many
/// seconds. Without one a new entry never expires; an overwrite keeps or
/// clears the old deadline as the policy's `set` does. A full capped cache refuses new
/// keys, which is reported through `stored: false`.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl();
    let SetRequest { key, value, .. } = req;

    let (stored, expires_at) = state.cache.with(|engine| {
        match ttl {
            Some(ttl) => engine.add(key.clone(), value, Some(ttl)),
            None => engine.set(key.clone(), value),
        };
        (engine.exists(&key), engine.expires_at(&key))
    });

    if !stored {
        debug!(key = %key, "Write refused by full cache");
    }

    Ok(Json(SetResponse::new(key, stored, expires_at)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let key = checked_key(key)?;
    let value = state
        .cache
        .get(&key)
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for GET /exists/:key
pub async fn exists_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ExistsResponse>> {
    let key = checked_key(key)?;
    let exists = state.cache.exists(&key);

    Ok(Json(ExistsResponse { key, exists }))
}

/// Handler for DELETE /del/:key
///
/// Deletes a key from the cache. Deleting a missing key succeeds.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let key = checked_key(key)?;
    let deleted = state.cache.delete(&key);

    Ok(Json(DeleteResponse::new(key, deleted)))
}

/// Handler for GET /keys
pub async fn keys_handler(State(state): State<AppState>) -> Json<KeysResponse> {
    Json(KeysResponse {
        keys: state.cache.keys(),
    })
}

/// Handler for DELETE /clear
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let cleared = state.cache.with(|engine| {
        let len = engine.len();
        engine.clear();
        len
    });
    info!(cleared, "Cache cleared");

    Json(ClearResponse {
        message: "Cache cleared".to_string(),
        cleared,
    })
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let (policy, capacity, stats) = state
        .cache
        .with(|engine| (engine.policy(), engine.capacity(), engine.stats()));

    Json(StatsResponse::new(policy, capacity, &stats))
}

/// Handler for POST /snapshot
///
/// Writes the cache to the configured snapshot file. The snapshot is taken
/// once under the lock; encoding and the file write run on the blocking
/// pool, and `entries` counts exactly what was written.
pub async fn snapshot_handler(State(state): State<AppState>) -> Result<Json<SnapshotResponse>> {
    let Some(path) = state.cache_config.snapshot_path.clone() else {
        return Err(CacheError::InvalidRequest(
            "No snapshot path configured".to_string(),
        ));
    };

    let snapshot = state.cache.snapshot();
    let entries = snapshot.len();
    let compressed = state.cache_config.compressed;
    let target = path.clone();
    tokio::task::spawn_blocking(move || codec::write_snapshot(&snapshot, &target, compressed))
        .await
        .map_err(|e| CacheError::Internal(format!("Snapshot task failed: {e}")))??;

    Ok(Json(SnapshotResponse {
        path: path.display().to_string(),
        entries,
        compressed,
    }))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
