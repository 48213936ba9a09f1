//! Capacity-bounded least-frequently-used cache.
//!
//! Entries live in a key -> node map. Nodes sharing a frequency form a
//! doubly-linked list (the frequency's bucket) ordered from most to least
//! recently used, so `get`, `put` and eviction are O(1). Eviction takes the
//! tail of the lowest-frequency bucket: fewest uses first, oldest use on ties.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::traits::CacheStats;

struct Node<K, V> {
    value: V,
    frequency: u64,
    /// Neighbour used more recently, within the same bucket.
    prev: Option<K>,
    /// Neighbour used less recently, within the same bucket.
    next: Option<K>,
}

struct Bucket<K> {
    head: K,
    tail: K,
}

struct LfuState<K, V> {
    capacity: usize,
    entries: HashMap<K, Node<K, V>>,
    buckets: HashMap<u64, Bucket<K>>,
    min_frequency: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<K, V> LfuState<K, V>
where
    K: Eq + Hash + Clone,
{
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            buckets: HashMap::new(),
            min_frequency: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Detach `key` from its bucket, dropping the bucket when it empties.
    /// Returns the frequency the key was filed under.
    fn unlink(&mut self, key: &K) -> Option<u64> {
        let (frequency, prev, next) = {
            let node = self.entries.get_mut(key)?;
            (node.frequency, node.prev.take(), node.next.take())
        };

        if let Some(p) = &prev {
            if let Some(node) = self.entries.get_mut(p) {
                node.next = next.clone();
            }
        }
        if let Some(n) = &next {
            if let Some(node) = self.entries.get_mut(n) {
                node.prev = prev.clone();
            }
        }

        match (prev, next) {
            (None, None) => {
                self.buckets.remove(&frequency);
            }
            (None, Some(n)) => {
                if let Some(bucket) = self.buckets.get_mut(&frequency) {
                    bucket.head = n;
                }
            }
            (Some(p), None) => {
                if let Some(bucket) = self.buckets.get_mut(&frequency) {
                    bucket.tail = p;
                }
            }
            (Some(_), Some(_)) => {}
        }

        Some(frequency)
    }

    /// File `key` as the most recent entry of its node's frequency bucket.
    fn link_front(&mut self, key: K) {
        let Some(frequency) = self.entries.get(&key).map(|node| node.frequency) else {
            return;
        };

        match self.buckets.get_mut(&frequency) {
            Some(bucket) => {
                let old_head = std::mem::replace(&mut bucket.head, key.clone());
                if let Some(node) = self.entries.get_mut(&old_head) {
                    node.prev = Some(key.clone());
                }
                if let Some(node) = self.entries.get_mut(&key) {
                    node.next = Some(old_head);
                }
            }
            None => {
                self.buckets.insert(
                    frequency,
                    Bucket {
                        head: key.clone(),
                        tail: key,
                    },
                );
            }
        }
    }

    /// Count one use of `key`: bump its frequency and make it the most recent.
    fn touch(&mut self, key: &K) {
        let Some(old) = self.unlink(key) else {
            return;
        };
        if self.min_frequency == old && !self.buckets.contains_key(&old) {
            self.min_frequency = old + 1;
        }
        if let Some(node) = self.entries.get_mut(key) {
            node.frequency = old + 1;
        }
        self.link_front(key.clone());
    }

    /// Drop the tail of the lowest-frequency bucket.
    ///
    /// Only called from `put` on a full cache. `remove` can leave
    /// `min_frequency` naming an empty bucket, but it also frees a slot, so
    /// the next `put` inserts without evicting and resets the minimum to 1.
    /// By the time the cache is full again the minimum is exact.
    fn evict(&mut self) -> Option<(K, V)> {
        debug_assert!(self.buckets.contains_key(&self.min_frequency));
        let victim = self.buckets.get(&self.min_frequency)?.tail.clone();
        self.unlink(&victim);
        let node = self.entries.remove(&victim)?;
        self.evictions += 1;
        Some((victim, node.value))
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        if !self.entries.contains_key(key) {
            self.misses += 1;
            return None;
        }
        self.hits += 1;
        self.touch(key);
        self.entries.get(key).map(|node| &node.value)
    }

    fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(node) = self.entries.get_mut(&key) {
            node.value = value;
            self.touch(&key);
            return None;
        }

        let evicted = if self.entries.len() >= self.capacity {
            self.evict()
        } else {
            None
        };

        self.entries.insert(
            key.clone(),
            Node {
                value,
                frequency: 1,
                prev: None,
                next: None,
            },
        );
        self.link_front(key);
        self.min_frequency = 1;
        evicted
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        self.unlink(key)?;
        self.entries.remove(key).map(|node| node.value)
    }
}

/// Thread-safe LFU cache with a fixed capacity.
///
/// Every operation takes one mutex around the whole structure; none of them
/// can fail. A poisoned mutex is recovered because each operation leaves the
/// links consistent before it can panic.
///
/// ```
/// use coworking_storage::LfuCache;
///
/// let cache = LfuCache::new(2);
/// cache.put(1, "a");
/// cache.put(2, "b");
/// cache.get(&1); // key 1 now used twice
/// cache.put(3, "c"); // evicts key 2
/// assert_eq!(cache.get(&2), None);
/// assert_eq!(cache.get(&1), Some("a"));
/// ```
pub struct LfuCache<K, V> {
    capacity: usize,
    state: Mutex<LfuState<K, V>>,
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            state: Mutex::new(LfuState::new(capacity)),
        }
    }

    fn state(&self) -> MutexGuard<'_, LfuState<K, V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up `key`, counting a use on hit.
    pub fn get(&self, key: &K) -> Option<V> {
        self.state().get(key).cloned()
    }

    /// Insert or overwrite `key`.
    ///
    /// Overwriting counts as a use. Inserting a new key into a full cache
    /// first evicts exactly one entry, which is returned.
    pub fn put(&self, key: K, value: V) -> Option<(K, V)> {
        let evicted = self.state().put(key, value);
        if let Some((victim, _)) = &evicted {
            tracing::debug!(key = ?victim, "LFU cache evicted entry");
        }
        evicted
    }

    /// Drop `key` if present.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.state().remove(key)
    }

    /// Whether `key` is cached, without counting a use.
    pub fn contains_key(&self, key: &K) -> bool {
        self.state().entries.contains_key(key)
    }

    /// Current use count of `key`, without counting a use.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.state().entries.get(key).map(|node| node.frequency)
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        let mut state = self.state();
        state.entries.clear();
        state.buckets.clear();
        state.min_frequency = 0;
    }

    /// Snapshot of hit/miss/eviction counters.
    pub fn stats(&self) -> CacheStats {
        let state = self.state();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            entry_count: state.entries.len() as u64,
            evictions: state.evictions,
        }
    }
}

impl<K, V> fmt::Debug for LfuCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuCache")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
