//! Shared Cache Module
//!
//! Thread-safe engine: one coarse lock around a [`Cache`].

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::codec::{self, Snapshot};
use crate::cache::{Cache, CacheStats, Policy, Usage};
use crate::error::Result;

// == Shared Cache ==
/// Cache engine guarded by a single mutex.
///
/// Every operation holds the lock for its whole duration. Composite
/// operations (`fetch_with`, `fetch_values_with`) lock once and run the
/// unguarded engine, so nothing re-acquires the lock. Persistence copies a
/// snapshot under the lock and encodes it after releasing it, so a save is
/// a point-in-time view that concurrent writers may already have moved past.
pub struct SharedCache<K, V> {
    inner: Mutex<Cache<K, V>>,
}

impl<K, V> From<Cache<K, V>> for SharedCache<K, V> {
    fn from(cache: Cache<K, V>) -> Self {
        Self {
            inner: Mutex::new(cache),
        }
    }
}

impl<K, V> SharedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an empty thread-safe cache.
    pub fn new(policy: Policy, capacity: Option<usize>) -> Self {
        Cache::new(policy, capacity).into()
    }

    /// Runs `f` with exclusive access to the underlying engine.
    pub fn with<R>(&self, f: impl FnOnce(&mut Cache<K, V>) -> R) -> R {
        f(&mut *self.inner.lock())
    }

    /// Unwraps the underlying engine.
    pub fn into_inner(self) -> Cache<K, V> {
        self.inner.into_inner()
    }

    pub fn policy(&self) -> Policy {
        self.inner.lock().policy()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.inner.lock().capacity()
    }

    pub fn exists<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().exists(key)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().get(key)
    }

    pub fn set(&self, key: K, value: V) -> V {
        self.inner.lock().set(key, value)
    }

    pub fn add(&self, key: K, value: V, ttl: Option<Duration>) -> V {
        self.inner.lock().add(key, value, ttl)
    }

    pub fn fetch<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().fetch(key)
    }

    /// See [`Cache::fetch_with`]. The fallback runs while the lock is held.
    pub fn fetch_with<F>(&self, key: K, fallback: F) -> V
    where
        F: FnOnce() -> V,
    {
        self.inner.lock().fetch_with(key, fallback)
    }

    pub fn fetch_values<'a, I>(&self, keys: I) -> Vec<Option<V>>
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        self.inner.lock().fetch_values(keys)
    }

    pub fn fetch_values_with<I, F>(&self, keys: I, fallback: F) -> Vec<V>
    where
        I: IntoIterator<Item = K>,
        F: FnMut() -> V,
    {
        self.inner.lock().fetch_values_with(keys, fallback)
    }

    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().delete(key)
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn keys(&self) -> Vec<K> {
        self.inner.lock().keys()
    }

    pub fn usage<Q>(&self, key: &Q) -> Option<Usage>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().usage(key)
    }

    pub fn expires_at<Q>(&self, key: &Q) -> Option<DateTime<Utc>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().expires_at(key)
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    // == Persistence ==
    /// Copies every entry under the lock.
    pub fn snapshot(&self) -> Snapshot<K, V> {
        self.inner.lock().snapshot()
    }

    pub fn to_bytes(&self, compressed: bool) -> Result<Vec<u8>>
    where
        K: Serialize,
        V: Serialize,
    {
        codec::encode(&self.snapshot(), compressed)
    }

    pub fn save_to<W: Write>(&self, mut writer: W, compressed: bool) -> Result<()>
    where
        K: Serialize,
        V: Serialize,
    {
        writer.write_all(&self.to_bytes(compressed)?)?;
        writer.flush()?;
        Ok(())
    }

    /// Writes a snapshot to `path`, replacing it atomically.
    pub fn save_to_path(&self, path: impl AsRef<Path>, compressed: bool) -> Result<()>
    where
        K: Serialize,
        V: Serialize,
    {
        codec::write_snapshot(&self.snapshot(), path.as_ref(), compressed)
    }

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
        Cache::from_bytes(policy, capacity, bytes, compressed).map(Self::from)
    }

    pub fn load_from<R: Read>(
        policy: Policy,
        capacity: Option<usize>,
        reader: R,
        compressed: bool,
    ) -> Result<Self>
    where
        K: DeserializeOwned,
        V: DeserializeOwned,
    {
        Cache::load_from(policy, capacity, reader, compressed).map(Self::from)
    }

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
        Cache::load_from_path(policy, capacity, path, compressed).map(Self::from)
    }
}

impl<K, V> fmt::Debug for SharedCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(cache) => f.debug_tuple("SharedCache").field(&*cache).finish(),
            None => f.write_str("SharedCache(<locked>)"),
        }
    }
}
