//! Sharded accumulator for parallel scoring.
//!
//! Keys are routed to one of a fixed number of shards, each an ordered map behind its
//! own mutex. Writers touching keys in different shards never contend; writers
//! touching the same key serialize on that key's shard, so no increment is lost.

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use std::collections::BTreeMap;

use crate::policy::default_workers;

/// Maps a key onto a shard.
pub trait ShardKey: Ord {
    fn shard_hint(&self) -> u64;
}

macro_rules! impl_shard_key {
    ($($t:ty),*) => {
        $(impl ShardKey for $t {
            #[inline]
            fn shard_hint(&self) -> u64 {
                *self as u64
            }
        })*
    };
}

impl_shard_key!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

pub struct ConcurrentMap<K, V> {
    shards: Vec<Mutex<BTreeMap<K, V>>>,
}

impl<K: ShardKey, V: Default> ConcurrentMap<K, V> {
    /// Create a map with `shard_count` shards (at least one).
    pub fn new(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1)).map(|_| Mutex::new(BTreeMap::new())).collect();
        Self { shards }
    }

    /// One shard per available CPU.
    pub fn with_default_shards() -> Self {
        Self::new(default_workers())
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Index of the shard that owns `key`.
    pub fn shard_of(&self, key: &K) -> usize {
        (key.shard_hint() % self.shards.len() as u64) as usize
    }

    /// Lock the key's shard and hand out its value, inserting `V::default()` first if needed.
    ///
    /// The shard stays locked for as long as the guard lives.
    pub fn entry(&self, key: K) -> MappedMutexGuard<'_, V> {
        let shard = self.shards[self.shard_of(&key)].lock();
        MutexGuard::map(shard, |map| map.entry(key).or_default())
    }

    pub fn erase(&self, key: &K) -> Option<V> {
        self.shards[self.shard_of(key)].lock().remove(key)
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merge every shard into one ordered map.
    ///
    /// Takes the map by value, so every writer must already be finished.
    pub fn build_ordinary_map(self) -> BTreeMap<K, V> {
        let mut out = BTreeMap::new();
        for shard in self.shards {
            out.extend(shard.into_inner());
        }
        out
    }
}
