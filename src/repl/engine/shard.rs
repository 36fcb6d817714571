//! Sharded concurrent map

use std::hash::{BuildHasher, Hash};

use hashbrown::{DefaultHashBuilder, HashMap};
use parking_lot::RwLock;

const DEFAULT_SHARDS: usize = 16;

/// A hash map split over independently locked shards
///
/// Keys hashing to different shards never contend, so upserts of unrelated
/// keys proceed in parallel.
pub struct ShardedMap<K, V> {
    shards: Box<[RwLock<HashMap<K, V>>]>,
    hasher: DefaultHashBuilder,
}

impl<K: Hash + Eq, V: Clone> Default for ShardedMap<K, V> {
    fn default() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }
}

impl<K: Hash + Eq, V: Clone> ShardedMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map with `count` shards (at least one)
    pub fn with_shards(count: usize) -> Self {
        let shards = (0..count.max(1))
            .map(|_| RwLock::new(HashMap::new()))
            .collect();
        Self {
            shards,
            hasher: DefaultHashBuilder::default(),
        }
    }

    fn shard(
        &self,
        key: &K,
    ) -> &RwLock<HashMap<K, V>> {
        let index = self.hasher.hash_one(key) as usize % self.shards.len();
        &self.shards[index]
    }

    pub fn get(
        &self,
        key: &K,
    ) -> Option<V> {
        self.shard(key).read().get(key).cloned()
    }

    pub fn contains_key(
        &self,
        key: &K,
    ) -> bool {
        self.shard(key).read().contains_key(key)
    }

    /// Insert or replace; returns the previous value
    pub fn insert(
        &self,
        key: K,
        value: V,
    ) -> Option<V> {
        self.shard(&key).write().insert(key, value)
    }

    /// Replace the entry for `key` with `f(current)` while holding its shard
    /// lock, and return the stored value
    ///
    /// `f` must not touch this map: the shard lock is not reentrant.
    pub fn upsert_with(
        &self,
        key: K,
        f: impl FnOnce(Option<&V>) -> V,
    ) -> V {
        let mut shard = self.shard(&key).write();
        let value = f(shard.get(&key));
        shard.insert(key, value.clone());
        value
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every entry; shards are visited one at a time
    pub fn entries(&self) -> Vec<(K, V)>
    where
        K: Clone,
    {
        let mut entries = Vec::new();
        for shard in self.shards.iter() {
            entries.extend(shard.read().iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        entries
    }
}
