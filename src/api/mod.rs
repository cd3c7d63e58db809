//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `PUT /set` - Store a key-value pair, optionally with a TTL
//! - `GET /get/:key` - Retrieve a value by key
//! - `GET /exists/:key` - Check whether a key is live
//! - `DELETE /del/:key` - Delete a key
//! - `GET /keys` - List keys in policy order
//! - `DELETE /clear` - Drop every entry
//! - `GET /stats` - Get cache statistics
//! - `POST /snapshot` - Save the cache to the configured snapshot file
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
