//! Sharded map for accumulating per-key values from many rayon workers.
//!
//! Keys are spread over a fixed number of buckets, each behind its own
//! `parking_lot::Mutex`, so concurrent updates only contend when they hit the
//! same bucket. A lock is held for one read-modify-write and never across a
//! call into other code.

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use std::collections::BTreeMap;
use std::ops::AddAssign;

/// Maps a key to one of `shard_count` buckets.
pub trait ShardKey: Ord + Copy {
    fn shard_index(&self, shard_count: usize) -> usize;
}

macro_rules! impl_shard_key {
    ($($t:ty),*) => {
        $(
            impl ShardKey for $t {
                #[inline]
                fn shard_index(&self, shard_count: usize) -> usize {
                    // rem_euclid keeps negative keys in range
                    (*self as i128).rem_euclid(shard_count as i128) as usize
                }
            }
        )*
    };
}

impl_shard_key!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

#[derive(Debug)]
pub struct ConcurrentMap<K, V> {
    shards: Vec<Mutex<BTreeMap<K, V>>>,
}

impl<K: ShardKey, V> ConcurrentMap<K, V> {
    /// A zero shard count is bumped to one.
    pub fn new(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1)).map(|_| Mutex::new(BTreeMap::new())).collect();
        Self { shards }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard(&self, key: &K) -> &Mutex<BTreeMap<K, V>> {
        &self.shards[key.shard_index(self.shards.len())]
    }

    /// Lock the key's bucket and return a guard to its value, inserting the
    /// default first if absent. The bucket stays locked while the guard lives.
    pub fn access(&self, key: K) -> MappedMutexGuard<'_, V>
    where
        V: Default,
    {
        let guard = self.shard(&key).lock();
        MutexGuard::map(guard, |bucket| bucket.entry(key).or_default())
    }

    pub fn increment(&self, key: K, delta: V)
    where
        V: Default + AddAssign,
    {
        *self.access(key) += delta;
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.shard(key).lock().remove(key)
    }

    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.shard(key).lock().get(key).cloned()
    }

    /// Number of keys, counted bucket by bucket.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|s| s.lock().is_empty())
    }

    /// Merge all buckets into one ordered map. Buckets are locked one at a
    /// time, so the result is consistent per bucket but not across them.
    pub fn snapshot(&self) -> BTreeMap<K, V>
    where
        V: Clone,
    {
        let mut merged = BTreeMap::new();
        for shard in &self.shards {
            let bucket = shard.lock();
            merged.extend(bucket.iter().map(|(k, v)| (*k, v.clone())));
        }
        merged
    }

    pub fn into_ordinary_map(self) -> BTreeMap<K, V> {
        let mut merged = BTreeMap::new();
        for shard in self.shards {
            merged.append(&mut shard.into_inner());
        }
        merged
    }
}
