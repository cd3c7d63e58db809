//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with an explicit key order,
//! lazy TTL expiration and a pluggable eviction policy.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::cache::codec::{self, Snapshot, SnapshotRecord};
use crate::cache::entry::deadline;
use crate::cache::stats::CacheEvent;
use crate::cache::{CacheEntry, CacheStats, KeyOrder, Policy, SharedCache, Usage};
use crate::error::Result;

// == Cache ==
/// Single-owner cache engine.
///
/// All operations take `&mut self`; wrap the engine in a [`SharedCache`]
/// to use it from several threads.
pub struct Cache<K, V> {
    /// Eviction strategy
    policy: Policy,
    /// Maximum number of entries, None = unbounded
    capacity: Option<usize>,
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// Recency order (LRU) or insertion order (LFU, capped)
    order: KeyOrder<K>,
    /// Performance statistics
    stats: CacheStats,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates an empty cache.
    ///
    /// A capacity of `None` or `Some(0)` disables capacity enforcement.
    pub fn new(policy: Policy, capacity: Option<usize>) -> Self {
        Self {
            policy,
            capacity: capacity.filter(|c| *c > 0),
            entries: HashMap::new(),
            order: KeyOrder::new(),
            stats: CacheStats::new(),
        }
    }

    /// Moves the engine behind a lock so it can be shared between threads.
    pub fn into_shared(self) -> SharedCache<K, V> {
        SharedCache::from(self)
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    // == Exists ==
    /// Returns true if the key is stored, expired or not.
    ///
    /// Does not purge expired entries.
    pub fn exists<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    // == Get ==
    /// Retrieves a live value by key and touches it.
    ///
    /// Expired entries are removed and reported as a miss.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_at(key, Utc::now())
    }

    pub(crate) fn get_at<Q>(&mut self, key: &Q, now: DateTime<Utc>) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired_at(now),
            None => {
                self.stats.record(CacheEvent::Miss);
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.stats.record(CacheEvent::Expired);
            self.stats.record(CacheEvent::Miss);
            debug!(policy = %self.policy, "Purged expired entry on read");
            return None;
        }

        self.touch(key, now);
        self.stats.record(CacheEvent::Hit);
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Stores a value and returns it.
    ///
    /// A new key gets no deadline. Overwriting a present key counts as a
    /// touch; under LFU it keeps the entry's deadline, under the other
    /// policies it clears it like `add(key, value, None)`.
    pub fn set(&mut self, key: K, value: V) -> V {
        self.set_at(key, value, Utc::now())
    }

    pub(crate) fn set_at(&mut self, key: K, value: V, now: DateTime<Utc>) -> V {
        if self.policy.set_keeps_deadline() {
            if let Some(entry) = self.entries.get_mut(&key) {
                entry.value = value.clone();
                self.touch(&key, now);
                return value;
            }
        }
        self.add_at(key, value, None, now)
    }

    // == Add ==
    /// Stores a value with an optional TTL and returns it.
    ///
    /// Overwriting an existing key counts as a touch and replaces both the
    /// value and the deadline. A new key arriving at a full cache first
    /// purges expired entries, then evicts according to the policy; the
    /// capped policy refuses the key instead.
    pub fn add(&mut self, key: K, value: V, ttl: Option<Duration>) -> V {
        self.add_at(key, value, ttl, Utc::now())
    }

    pub(crate) fn add_at(
        &mut self,
        key: K,
        value: V,
        ttl: Option<Duration>,
        now: DateTime<Utc>,
    ) -> V {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.value = value.clone();
            entry.expires_at = deadline(ttl, now);
            self.touch(&key, now);
            return value;
        }

        let usage = self.policy.initial_usage(now);
        let entry = CacheEntry::new(value.clone(), ttl, usage, now);
        self.insert_new(key, entry, now);
        value
    }

    // == Fetch ==
    /// Returns the live value for `key`, if any.
    pub fn fetch<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key)
    }

    /// Returns the live value for `key`, or stores and returns the result of
    /// `fallback`.
    ///
    /// The fallback runs at most once, only on a miss, and its result is
    /// stored without a deadline.
    pub fn fetch_with<F>(&mut self, key: K, fallback: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }
        self.set(key, fallback())
    }

    /// Applies [`Cache::fetch`] to each key, preserving input order.
    pub fn fetch_values<'a, I>(&mut self, keys: I) -> Vec<Option<V>>
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        keys.into_iter().map(|key| self.fetch(key)).collect()
    }

    /// Applies [`Cache::fetch_with`] to each key, preserving input order.
    pub fn fetch_values_with<I, F>(&mut self, keys: I, mut fallback: F) -> Vec<V>
    where
        I: IntoIterator<Item = K>,
        F: FnMut() -> V,
    {
        keys.into_iter()
            .map(|key| self.fetch_with(key, &mut fallback))
            .collect()
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether it was present.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).is_some()
    }

    // == Clear ==
    /// Removes all entries and resets the order queue.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    // == Keys ==
    /// Stored keys, head of the order queue first.
    pub fn keys(&self) -> Vec<K> {
        self.order.iter().cloned().collect()
    }

    /// Usage metadata of a stored entry, without touching it.
    pub fn usage<Q>(&self, key: &Q) -> Option<Usage>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|entry| entry.usage)
    }

    /// Deadline of a stored entry, without touching it.
    pub fn expires_at<Q>(&self, key: &Q) -> Option<DateTime<Utc>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).and_then(|entry| entry.expires_at)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.with_entries(self.entries.len())
    }

    // == Cleanup Expired ==
    /// Removes all entries expired at `now`.
    ///
    /// Only called when an insert finds the cache full.
    fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let expired_keys: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(key);
            self.stats.record(CacheEvent::Expired);
        }

        expired_keys.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Internals ==
    /// Updates recency or frequency metadata of a present key.
    fn touch<Q>(&mut self, key: &Q, now: DateTime<Utc>)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(entry) = self.entries.get_mut(key) else {
            return;
        };

        match self.policy {
            Policy::NoEviction => {}
            Policy::Lru => entry.usage = Usage::LastUsed(now),
            Policy::Lfu => entry.usage = Usage::Count(entry.use_count().saturating_add(1)),
        }

        if self.policy.reorders_on_touch() {
            self.order.touch(key);
        }
    }

    /// Inserts a key known to be absent, making room first.
    ///
    /// Returns false when the capped policy refuses the key.
    fn insert_new(&mut self, key: K, entry: CacheEntry<V>, now: DateTime<Utc>) -> bool {
        if !self.make_room(now) {
            self.stats.record(CacheEvent::Rejected);
            debug!(
                policy = %self.policy,
                capacity = ?self.capacity,
                "Cache full, refusing new key"
            );
            return false;
        }

        self.entries.insert(key.clone(), entry);
        self.order.push(key);
        true
    }

    /// Ensures one free slot below capacity.
    fn make_room(&mut self, now: DateTime<Utc>) -> bool {
        let Some(capacity) = self.capacity else {
            return true;
        };
        if self.entries.len() < capacity {
            return true;
        }

        let purged = self.purge_expired(now);
        if purged > 0 {
            debug!(purged, "Purged expired entries to make room");
        }

        while self.entries.len() >= capacity {
            let Some(victim) = self.eviction_candidate() else {
                return false;
            };
            self.remove_entry(&victim);
            self.stats.record(CacheEvent::Evicted);
            debug!(policy = %self.policy, entries = self.entries.len(), "Evicted entry");
        }

        true
    }

    /// Key the policy sacrifices next.
    fn eviction_candidate(&self) -> Option<K> {
        match self.policy {
            Policy::NoEviction => None,
            Policy::Lru => self.order.peek_head().cloned(),
            // min_by_key keeps the first minimum, so ties go to the oldest insertion
            Policy::Lfu => self
                .order
                .iter()
                .filter_map(|key| self.entries.get(key).map(|e| (key, e.use_count())))
                .min_by_key(|(_, count)| *count)
                .map(|(key, _)| key.clone()),
        }
    }

    fn remove_entry<Q>(&mut self, key: &Q) -> Option<CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.entries.remove(key)?;
        self.order.remove(key);
        Some(removed)
    }

    // == Snapshots ==
    /// Copies every entry, in order-queue sequence.
    pub fn snapshot(&self) -> Snapshot<K, V> {
        let entries = self
            .order
            .iter()
            .filter_map(|key| {
                self.entries.get(key).map(|entry| SnapshotRecord {
                    key: key.clone(),
                    value: entry.value.clone(),
                    expires_at: entry.expires_at,
                    usage: entry.usage,
                })
            })
            .collect();
        Snapshot::new(self.policy, entries)
    }

    /// Rebuilds an engine from a snapshot.
    ///
    /// The new engine's policy and capacity govern: records are replayed in
    /// order through the normal insert rule and their usage metadata is
    /// adapted to `policy`.
    pub fn from_snapshot(
        policy: Policy,
        capacity: Option<usize>,
        snapshot: Snapshot<K, V>,
    ) -> Self {
        let now = Utc::now();
        let mut cache = Self::new(policy, capacity);

        for record in snapshot.entries {
            let entry = CacheEntry {
                value: record.value,
                expires_at: record.expires_at,
                usage: policy.adopt_usage(record.usage, now),
            };
            if cache.entries.contains_key(&record.key) {
                cache.entries.insert(record.key, entry);
            } else {
                cache.insert_new(record.key, entry, now);
            }
        }

        cache.stats = CacheStats::new();
        cache
    }

    // == Persistence ==
    /// Encodes the entries, deflated when `compressed` is set.
    pub fn to_bytes(&self, compressed: bool) -> Result<Vec<u8>>
    where
        K: Serialize,
        V: Serialize,
    {
        codec::encode(&self.snapshot(), compressed)
    }

    /// Writes the encoded entries to `writer`.
    pub fn save_to<W: Write>(&self, mut writer: W, compressed: bool) -> Result<()>
    where
        K: Serialize,
        V: Serialize,
    {
        writer.write_all(&self.to_bytes(compressed)?)?;
        writer.flush()?;
        Ok(())
    }

    /// Writes the encoded entries to `path`, replacing it atomically.
    pub fn save_to_path(&self, path: impl AsRef<Path>, compressed: bool) -> Result<()>
    where
        K: Serialize,
        V: Serialize,
    {
        codec::write_snapshot(&self.snapshot(), path.as_ref(), compressed)
    }

    /// Builds an engine from bytes produced by [`Cache::to_bytes`].
    pub fn from_bytes(
        policy: Policy,
        capacity: Option<usize>,
        bytes: &[u8],
        compressed: bool,
    ) -> Result<Self>
    where
        K: DeserializeOwned,
        V: DeserializeOwned,
    {
        let snapshot = codec::decode(bytes, compressed)?;
        Ok(Self::from_snapshot(policy, capacity, snapshot))
    }

    /// Builds an engine from everything `reader` yields.
    pub fn load_from<R: Read>(
        policy: Policy,
        capacity: Option<usize>,
        mut reader: R,
        compressed: bool,
    ) -> Result<Self>
    where
        K: DeserializeOwned,
        V: DeserializeOwned,
    {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(policy, capacity, &bytes, compressed)
    }

    /// Builds an engine from a snapshot file.
    pub fn load_from_path(
        policy: Policy,
        capacity: Option<usize>,
        path: impl AsRef<Path>,
        compressed: bool,
    ) -> Result<Self>
    where
        K: DeserializeOwned,
        V: DeserializeOwned,
    {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let cache = Self::from_bytes(policy, capacity, &bytes, compressed)?;
        info!(
            path = %path.display(),
            entries = cache.len(),
            policy = %policy,
            "Cache snapshot loaded"
        );
        Ok(cache)
    }
}

impl<K, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("policy", &self.policy)
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
