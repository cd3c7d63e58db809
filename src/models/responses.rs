//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{CacheStats, Policy};

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: String,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Outcome message
    pub message: String,
    /// The key that was set
    pub key: String,
    /// Whether the key is live after the write
    pub stored: bool,
    /// Deadline of the entry, absent when it never expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>, stored: bool, expires_at: Option<DateTime<Utc>>) -> Self {
        let key = key.into();
        let message = if stored {
            format!("Key '{}' set successfully", key)
        } else {
            format!("Key '{}' refused, cache is full", key)
        };
        Self {
            message,
            key,
            stored,
            expires_at,
        }
    }
}

/// Response body for the EXISTS operation (GET /exists/:key)
#[derive(Debug, Clone, Serialize)]
pub struct ExistsResponse {
    pub key: String,
    pub exists: bool,
}

/// Response body for the DELETE operation (DELETE /del/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Outcome message
    pub message: String,
    /// The key that was deleted
    pub key: String,
    /// Whether an entry was actually removed
    pub deleted: bool,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>, deleted: bool) -> Self {
        let key = key.into();
        let message = if deleted {
            format!("Key '{}' deleted successfully", key)
        } else {
            format!("Key '{}' was not present", key)
        };
        Self {
            message,
            key,
            deleted,
        }
    }
}

/// Response body for the KEYS operation (GET /keys)
#[derive(Debug, Clone, Serialize)]
pub struct KeysResponse {
    pub keys: Vec<String>,
}

/// Response body for a cleared cache (DELETE /clear)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    /// Number of entries dropped
    pub cleared: usize,
}

/// Response body for the snapshot endpoint (POST /snapshot)
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotResponse {
    /// File the snapshot was written to
    pub path: String,
    /// Number of entries stored at the time of the save
    pub entries: usize,
    pub compressed: bool,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Active eviction policy
    pub policy: Policy,
    /// Maximum entries, absent when unbounded
    pub capacity: Option<usize>,
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Number of expired entries purged
    pub expired: u64,
    /// Number of new keys refused by a full cache
    pub rejected: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(policy: Policy, capacity: Option<usize>, stats: &CacheStats) -> Self {
        Self {
            policy,
            capacity,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expired: stats.expired,
            rejected: stats.rejected,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_response_serialize() {
        let resp = GetResponse::new("test_key", "test_value");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("test_key"));
        assert!(json.contains("test_value"));
    }

    #[test]
    fn test_set_response_messages() {
        let stored = SetResponse::new("my_key", true, None);
        let json = serde_json::to_value(&stored).unwrap();
        assert!(json["message"].as_str().unwrap().contains("successfully"));
        assert!(json.get("expires_at").is_none());

        let refused = SetResponse::new("my_key", false, None);
        assert!(!refused.stored);
        assert!(refused.message.contains("full"));
    }

    #[test]
    fn test_delete_response_serialize() {
        let resp = DeleteResponse::new("deleted_key", true);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("deleted_key"));
        assert!(json.contains("deleted successfully"));

        let missing = DeleteResponse::new("ghost", false);
        assert!(missing.message.contains("not present"));
    }

    #[test]
    fn test_stats_response_from_stats() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            evictions: 5,
            expired: 2,
            rejected: 1,
            total_entries: 100,
        };
        let resp = StatsResponse::new(Policy::Lfu, Some(128), &stats);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["policy"], "lfu");
        assert_eq!(json["capacity"], 128);
        assert_eq!(json["rejected"], 1);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::new(Policy::Lru, None, &CacheStats::new());
        assert_eq!(resp.hit_rate, 0.0);
        assert!(resp.capacity.is_none());
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
