//! Cache Entry Module
//!
//! Defines individual cache entries with an optional deadline and the
//! usage metadata each eviction policy tracks.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

// == Usage ==
/// Policy-specific usage metadata carried by an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Usage {
    /// No usage tracking (capped policy)
    Untracked,
    /// Last time the entry was touched (LRU)
    LastUsed(DateTime<Utc>),
    /// Number of touches since insertion (LFU)
    Count(u64),
}

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Absolute deadline, None = never expires
    pub expires_at: Option<DateTime<Utc>>,
    /// Policy metadata
    pub usage: Usage,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry with optional TTL, measured from `now`.
    ///
    /// A TTL too large to be represented as a deadline means the entry never
    /// expires.
    pub fn new(value: V, ttl: Option<Duration>, usage: Usage, now: DateTime<Utc>) -> Self {
        Self {
            value,
            expires_at: deadline(ttl, now),
            usage,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has expired at `now`.
    ///
    /// The deadline itself is still live: an entry is expired only once
    /// `expires_at < now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires) if expires < now)
    }

    /// Use-count for LFU entries, zero for everything else.
    pub fn use_count(&self) -> u64 {
        match self.usage {
            Usage::Count(count) => count,
            _ => 0,
        }
    }
}

/// Converts a relative TTL into an absolute deadline.
pub(crate) fn deadline(ttl: Option<Duration>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let ttl = TimeDelta::from_std(ttl?).ok()?;
    now.checked_add_signed(ttl)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = CacheEntry::new("test_value", None, Usage::Untracked, Utc::now());

        assert_eq!(entry.value, "test_value");
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_entry_creation_with_ttl() {
        let entry = CacheEntry::new(
            "test_value",
            Some(Duration::from_secs(60)),
            Usage::Count(0),
            Utc::now(),
        );

        assert!(entry.expires_at.is_some());
        assert!(!entry.is_expired_at(Utc::now()));
        assert_eq!(entry.use_count(), 0);
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(
            "test_value",
            Some(Duration::from_millis(50)),
            Usage::Untracked,
            Utc::now(),
        );

        assert!(!entry.is_expired_at(Utc::now()));

        sleep(Duration::from_millis(80));

        assert!(entry.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Utc::now();
        let entry = CacheEntry {
            value: "test",
            expires_at: Some(now),
            usage: Usage::Untracked,
        };

        // The deadline instant itself is still live
        assert!(!entry.is_expired_at(now));
        assert!(entry.is_expired_at(now + TimeDelta::nanoseconds(1)));
    }

    #[test]
    fn test_zero_ttl_expires_after_any_elapsed_time() {
        let now = Utc::now();
        let entry = CacheEntry::new(1, Some(Duration::ZERO), Usage::Untracked, now);

        assert_eq!(entry.expires_at, Some(now));
        assert!(entry.is_expired_at(now + TimeDelta::milliseconds(1)));
    }

    #[test]
    fn test_huge_ttl_never_expires() {
        let entry = CacheEntry::new(1, Some(Duration::MAX), Usage::Untracked, Utc::now());
        assert!(entry.expires_at.is_none());
    }
}
