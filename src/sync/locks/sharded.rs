/*!
 * Sharded Hash Map
 * Fixed array of independently locked buckets
 */

use crate::core::config::{SyncConfig, DEFAULT_BUCKET_COUNT};
use crate::core::errors::Result;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};
use tracing::debug;

/// One shard: a short list of unique-key entries behind a read/write lock
struct Bucket<K, V> {
    entries: RwLock<Vec<(K, V)>>,
}

impl<K: Eq, V> Bucket<K, V> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(Vec::with_capacity(capacity)),
        }
    }

    #[inline]
    fn position(entries: &[(K, V)], key: &K) -> Option<usize> {
        entries.iter().position(|(k, _)| k == key)
    }

    fn read<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Option<R> {
        let entries = self.entries.read();
        Self::position(&entries, key).map(|i| f(&entries[i].1))
    }

    fn upsert(&self, key: K, value: V) -> Option<V> {
        let mut entries = self.entries.write();
        match Self::position(&entries, &key) {
            Some(i) => Some(std::mem::replace(&mut entries[i].1, value)),
            None => {
                entries.push((key, value));
                None
            }
        }
    }

    fn remove(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.write();
        Self::position(&entries, key).map(|i| entries.swap_remove(i).1)
    }
}

/// Concurrent hash map with a fixed number of independently locked buckets
///
/// A key always lands in bucket `hash(key) % bucket_count`. The bucket count
/// never changes, so a key's bucket is stable for the life of the map and no
/// operation ever needs more than one bucket lock.
///
/// # Performance
///
/// - **Reads**: shared lock on one bucket; readers of a bucket run in parallel
/// - **Writes**: exclusive lock on one bucket only
/// - **Default**: 19 buckets (prime, limits clustering from weak hashes)
///
/// # Example
///
/// ```ignore
/// let sessions = ShardedMap::new();
/// sessions.upsert(user_id, session);
/// let active = sessions.get_or(&user_id, Session::anonymous());
/// sessions.remove(&user_id);
/// ```
pub struct ShardedMap<K, V, S = ahash::RandomState> {
    buckets: Box<[Bucket<K, V>]>,
    hash_builder: S,
}

impl<K: Hash + Eq, V> ShardedMap<K, V, ahash::RandomState> {
    /// Create a map with the default bucket count
    pub fn new() -> Self {
        Self::with_buckets(DEFAULT_BUCKET_COUNT)
    }

    /// Create a map with `bucket_count` buckets
    ///
    /// # Panics
    ///
    /// Panics if `bucket_count` is zero.
    pub fn with_buckets(bucket_count: usize) -> Self {
        Self::with_hasher(bucket_count, ahash::RandomState::new())
    }

    /// Create a map from a validated configuration
    pub fn with_config(config: &SyncConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(
            config.bucket_count,
            config.bucket_capacity,
            ahash::RandomState::new(),
        ))
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> ShardedMap<K, V, S> {
    /// Create a map with a caller-supplied hash builder
    ///
    /// # Panics
    ///
    /// Panics if `bucket_count` is zero.
    pub fn with_hasher(bucket_count: usize, hash_builder: S) -> Self {
        assert!(bucket_count > 0, "Bucket count must be at least 1");
        Self::build(bucket_count, 0, hash_builder)
    }

    fn build(bucket_count: usize, bucket_capacity: usize, hash_builder: S) -> Self {
        let buckets = (0..bucket_count)
            .map(|_| Bucket::with_capacity(bucket_capacity))
            .collect();

        debug!(bucket_count, bucket_capacity, "sharded map created");

        Self {
            buckets,
            hash_builder,
        }
    }

    #[inline]
    fn bucket_index(&self, key: &K) -> usize {
        (self.hash_builder.hash_one(key) % self.buckets.len() as u64) as usize
    }

    #[inline]
    fn bucket(&self, key: &K) -> &Bucket<K, V> {
        &self.buckets[self.bucket_index(key)]
    }

    /// Number of buckets (fixed at construction)
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Copy of the value for `key`
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.bucket(key).read(key, V::clone)
    }

    /// Copy of the value for `key`, or `default` when absent
    pub fn get_or(&self, key: &K, default: V) -> V
    where
        V: Clone,
    {
        self.get(key).unwrap_or(default)
    }

    /// Run `f` on the value for `key` under the bucket's read lock
    pub fn get_with<F, R>(&self, key: &K, f: F) -> Option<R>
    where
        F: FnOnce(&V) -> R,
    {
        self.bucket(key).read(key, f)
    }

    /// Insert or overwrite, returning the previous value
    pub fn upsert(&self, key: K, value: V) -> Option<V> {
        let idx = self.bucket_index(&key);
        self.buckets[idx].upsert(key, value)
    }

    /// Remove `key`, returning its value if it was present
    pub fn remove(&self, key: &K) -> Option<V> {
        self.bucket(key).remove(key)
    }

    /// Check if key exists
    pub fn contains_key(&self, key: &K) -> bool {
        self.bucket(key).read(key, |_| ()).is_some()
    }

    /// Total entries; buckets are counted one at a time
    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.entries.read().len()).sum()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|b| b.entries.read().is_empty())
    }

    /// Consistent copy of every entry
    ///
    /// Read locks are taken in ascending bucket order and all held until the
    /// copy is complete, so the result reflects a single point in time.
    pub fn snapshot(&self) -> HashMap<K, V>
    where
        K: Clone,
        V: Clone,
    {
        let guards: Vec<_> = self.buckets.iter().map(|b| b.entries.read()).collect();
        let snapshot: HashMap<K, V> = guards
            .iter()
            .flat_map(|entries| entries.iter().cloned())
            .collect();
        snapshot
    }
}

impl<K: Hash + Eq, V> Default for ShardedMap<K, V, ahash::RandomState> {
    fn default() -> Self {
        Self::new()
    }
}
