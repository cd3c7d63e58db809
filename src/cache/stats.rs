//! Cache Statistics Module
//!
//! Counts lookups and the ways entries leave (or fail to enter) a cache.

use serde::Serialize;

/// Something the engine observed while serving an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheEvent {
    Hit,
    Miss,
    /// A live entry was dropped to make room
    Evicted,
    /// An entry was found past its deadline and removed
    Expired,
    /// A capped cache turned a new key away
    Rejected,
}

// == Cache Stats ==
/// Point-in-time counters of a cache.
///
/// Counters start at zero when an engine is created or restored from a
/// snapshot; they are not persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Reads that returned a live value
    pub hits: u64,
    /// Reads that found nothing live (absent or expired)
    pub misses: u64,
    /// Live entries evicted to make room
    pub evictions: u64,
    /// Expired entries removed lazily
    pub expired: u64,
    /// New keys refused by a full capped cache
    pub rejected: u64,
    /// Entries stored when the stats were taken
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of reads that hit, 0.0 before the first read.
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }

    /// Total reads served.
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    pub(crate) fn record(&mut self, event: CacheEvent) {
        let counter = match event {
            CacheEvent::Hit => &mut self.hits,
            CacheEvent::Miss => &mut self.misses,
            CacheEvent::Evicted => &mut self.evictions,
            CacheEvent::Expired => &mut self.expired,
            CacheEvent::Rejected => &mut self.rejected,
        };
        *counter = counter.saturating_add(1);
    }

    /// Copy of the counters stamped with the current entry count.
    pub(crate) fn with_entries(&self, total_entries: usize) -> Self {
        Self {
            total_entries,
            ..self.clone()
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn recorded(events: &[CacheEvent]) -> CacheStats {
        let mut stats = CacheStats::new();
        for event in events {
            stats.record(*event);
        }
        stats
    }

    #[test]
    fn test_fresh_stats_are_zero() {
        let stats = CacheStats::new();
        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.lookups(), 0);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate() {
        use CacheEvent::*;
        assert_eq!(recorded(&[Hit, Hit, Hit, Miss]).hit_rate(), 0.75);
        assert_eq!(recorded(&[Miss, Miss]).hit_rate(), 0.0);
        assert_eq!(recorded(&[Hit]).hit_rate(), 1.0);
    }

    #[test]
    fn test_events_feed_their_own_counter() {
        use CacheEvent::*;
        let stats = recorded(&[Evicted, Evicted, Expired, Miss, Rejected]);
        assert_eq!(stats.evictions, 2);
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_with_entries_keeps_counters() {
        let stats = recorded(&[CacheEvent::Hit]).with_entries(42);
        assert_eq!(stats.total_entries, 42);
        assert_eq!(stats.hits, 1);
    }
}
