//! Eviction Policy Module
//!
//! Enumerates the eviction strategies an engine can be built with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::Usage;
use crate::error::CacheError;

// == Policy ==
/// Eviction strategy applied when a new key arrives at a full cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Hard cap on growth: new keys are refused once full, nothing is evicted
    NoEviction,
    /// Evicts the least recently touched key
    #[default]
    Lru,
    /// Evicts the key with the smallest use-count, oldest insertion first on ties
    Lfu,
}

impl Policy {
    /// Every known policy, in registry order.
    pub const ALL: [Policy; 3] = [Policy::NoEviction, Policy::Lru, Policy::Lfu];

    /// Name used in configuration and persisted snapshots.
    pub fn name(self) -> &'static str {
        match self {
            Policy::NoEviction => "no_eviction",
            Policy::Lru => "lru",
            Policy::Lfu => "lfu",
        }
    }

    /// Whether reads move a key in the order queue.
    pub(crate) fn reorders_on_touch(self) -> bool {
        matches!(self, Policy::Lru)
    }

    /// Whether a plain `set` on a present key leaves its deadline alone.
    ///
    /// Only LFU does; the other policies rebuild the entry without one.
    pub(crate) fn set_keeps_deadline(self) -> bool {
        matches!(self, Policy::Lfu)
    }

    /// Fresh usage metadata for a newly inserted entry.
    pub(crate) fn initial_usage(self, now: chrono::DateTime<chrono::Utc>) -> Usage {
        match self {
            Policy::NoEviction => Usage::Untracked,
            Policy::Lru => Usage::LastUsed(now),
            Policy::Lfu => Usage::Count(0),
        }
    }

    /// Adapts usage metadata produced by another policy to this one.
    pub(crate) fn adopt_usage(self, usage: Usage, now: chrono::DateTime<chrono::Utc>) -> Usage {
        match (self, usage) {
            (Policy::Lru, Usage::LastUsed(at)) => Usage::LastUsed(at),
            (Policy::Lfu, Usage::Count(count)) => Usage::Count(count),
            (policy, _) => policy.initial_usage(now),
        }
    }

    fn allowed_names() -> String {
        Self::ALL
            .iter()
            .map(|p| p.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Policy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| CacheError::InvalidPolicy {
                name: s.to_string(),
                allowed: Self::allowed_names(),
            })
    }
}
