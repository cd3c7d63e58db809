//! Error types for the cache
//!
//! Provides unified error handling using thiserror. Cache misses are not
//! errors: the engine reports them as `None`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache library and its HTTP front-end.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Unknown eviction policy name
    #[error("Invalid cache policy '{name}', expected one of: {allowed}")]
    InvalidPolicy { name: String, allowed: String },

    /// Persisted bytes could not be decompressed or decoded
    #[error("Corrupt cache data: {0}")]
    CorruptCacheData(String),

    /// Snapshot storage failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key not found (HTTP surface only)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) | CacheError::InvalidPolicy { .. } => {
                StatusCode::BAD_REQUEST
            }
            CacheError::CorruptCacheData(_) | CacheError::Io(_) | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
