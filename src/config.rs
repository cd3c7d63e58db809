//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::cache::{CacheConfig, Policy, DEFAULT_CAPACITY};
use crate::error::Result;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Eviction policy of the served cache
    pub policy: Policy,
    /// Maximum number of entries, 0 = unbounded
    pub max_entries: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Snapshot file restored at startup and written at shutdown
    pub snapshot_path: Option<PathBuf>,
    /// Whether the snapshot file is compressed
    pub snapshot_compressed: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_POLICY` - `no_eviction`, `lru` or `lfu` (default: lru)
    /// - `MAX_ENTRIES` - Maximum cache entries, 0 = unbounded (default: 1024)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SNAPSHOT_PATH` - Snapshot file (default: none)
    /// - `SNAPSHOT_COMPRESSED` - Compress the snapshot (default: true)
    ///
    /// Unparsable numbers fall back to their default; an unknown policy name
    /// is an error.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let policy = match env::var("CACHE_POLICY") {
            Ok(name) if !name.trim().is_empty() => name.parse()?,
            _ => defaults.policy,
        };

        Ok(Self {
            policy,
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            snapshot_path: env::var_os("SNAPSHOT_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            snapshot_compressed: parse_var("SNAPSHOT_COMPRESSED")
                .unwrap_or(defaults.snapshot_compressed),
        })
    }

    /// The cache part of the configuration.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            policy: self.policy,
            capacity: Some(self.max_entries),
            snapshot_path: self.snapshot_path.clone(),
            compressed: self.snapshot_compressed,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policy: Policy::Lru,
            max_entries: DEFAULT_CAPACITY,
            server_port: 3000,
            snapshot_path: None,
            snapshot_compressed: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;

    const VARS: [&str; 5] = [
        "CACHE_POLICY",
        "MAX_ENTRIES",
        "SERVER_PORT",
        "SNAPSHOT_PATH",
        "SNAPSHOT_COMPRESSED",
    ];

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.policy, Policy::Lru);
        assert_eq!(config.max_entries, 1024);
        assert_eq!(config.server_port, 3000);
        assert!(config.snapshot_path.is_none());
        assert!(config.snapshot_compressed);
    }

    #[test]
    fn test_cache_config_projection() {
        let config = Config {
            policy: Policy::Lfu,
            max_entries: 0,
            snapshot_path: Some(PathBuf::from("cache.dump")),
            ..Config::default()
        };
        let cache = config.cache_config();
        assert_eq!(cache.policy, Policy::Lfu);
        assert_eq!(cache.capacity, Some(0));
        assert_eq!(cache.snapshot_path, Some(PathBuf::from("cache.dump")));
        assert!(cache.compressed);
    }

    // Environment variables are process-global, so every env case runs in
    // one test to avoid races between parallel tests.
    #[test]
    fn test_config_from_env() {
        for var in VARS {
            env::remove_var(var);
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.policy, Policy::Lru);
        assert_eq!(config.max_entries, 1024);
        assert_eq!(config.server_port, 3000);
        assert!(config.snapshot_path.is_none());

        env::set_var("CACHE_POLICY", "LFU");
        env::set_var("MAX_ENTRIES", "16");
        env::set_var("SERVER_PORT", "not-a-port");
        env::set_var("SNAPSHOT_PATH", "/tmp/mini_cache.dump");
        env::set_var("SNAPSHOT_COMPRESSED", "false");

        let config = Config::from_env().unwrap();
        assert_eq!(config.policy, Policy::Lfu);
        assert_eq!(config.max_entries, 16);
        assert_eq!(config.server_port, 3000);
        assert_eq!(
            config.snapshot_path,
            Some(PathBuf::from("/tmp/mini_cache.dump"))
        );
        assert!(!config.snapshot_compressed);

        env::set_var("CACHE_POLICY", "random");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, CacheError::InvalidPolicy { .. }));

        for var in VARS {
            env::remove_var(var);
        }
    }
}
