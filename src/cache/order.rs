//! Key Order Module
//!
//! Explicit ordered queue of keys backing every eviction policy.

use std::borrow::Borrow;
use std::collections::VecDeque;

// == Key Order ==
/// Ordered sequence of cache keys.
///
/// Keys are stored in a VecDeque where:
/// - Front (head) = least recently used, or oldest insertion
/// - Back (tail) = most recently used, or newest insertion
///
/// LRU moves keys to the tail on every touch; the other policies only
/// append on insert, which keeps plain insertion order.
#[derive(Debug, Clone)]
pub struct KeyOrder<K> {
    order: VecDeque<K>,
}

impl<K> Default for KeyOrder<K> {
    fn default() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }
}

impl<K> KeyOrder<K> {
    // == Constructor ==
    /// Creates a new empty key order.
    pub fn new() -> Self {
        Self::default()
    }

    // == Push ==
    /// Appends a key that is not yet tracked at the tail.
    pub fn push(&mut self, key: K) {
        self.order.push_back(key);
    }

    // == Touch ==
    /// Marks a key as most recently used (moves it to the tail).
    ///
    /// Untracked keys are ignored.
    pub fn touch<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        if let Some(k) = self.position(key).and_then(|pos| self.order.remove(pos)) {
            self.order.push_back(k);
        }
    }

    // == Remove ==
    /// Removes a key from the order. No-op if the key is not tracked.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.position(key).and_then(|pos| self.order.remove(pos))
    }

    // == Peek Head ==
    /// Returns the head key without removing it.
    pub fn peek_head(&self) -> Option<&K> {
        self.order.front()
    }

    /// Iterates keys from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    fn position<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.order.iter().position(|k| k.borrow() == key)
    }
}
