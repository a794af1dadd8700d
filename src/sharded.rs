use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Instant;

use ahash::RandomState;
use once_cell::sync::Lazy;

use crate::context::Context;
use crate::error::Error;
use crate::lru::LruCache;
use crate::stats::Statistics;
use crate::Cache;

/// The function used to route keys to shards.
///
/// Only the distribution matters for balance; correctness holds for any
/// function. Negative hashes are folded by absolute value before the
/// modular reduction.
pub type HashFn<K> = Arc<dyn Fn(&K) -> i64 + Send + Sync>;

// One process-wide random state so a key routes to the same shard for the
// life of the process.
static HASH_STATE: Lazy<RandomState> = Lazy::new(RandomState::new);

/// A ready-made shard hash for any hashable key.
pub fn default_hash<K: Hash + ?Sized>(key: &K) -> i64 {
  HASH_STATE.hash_one(key) as i64
}

/// A fan-out front over independent [`LruCache`] shards.
///
/// Each shard has its own mutex, map, recency list and counters, and is
/// built with the full configured capacity. Recency is tracked per shard;
/// there is no global LRU order across shards.
///
/// Built through [`CacheBuilder`](crate::CacheBuilder).
pub struct ShardedCache<K, V> {
  shards: Box<[LruCache<K, V>]>,
  hash_fn: HashFn<K>,
}

impl<K, V> fmt::Debug for ShardedCache<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ShardedCache")
      .field("shards", &self.shards.len())
      .finish_non_exhaustive()
  }
}

impl<K, V> ShardedCache<K, V>
where
  K: Eq + Hash + Clone,
{
  pub(crate) fn new(shards: Vec<LruCache<K, V>>, hash_fn: HashFn<K>) -> Self {
    Self {
      shards: shards.into_boxed_slice(),
      hash_fn,
    }
  }

  fn shard(&self, key: &K) -> &LruCache<K, V> {
    let hash = (self.hash_fn)(key);
    let index = hash.unsigned_abs() as usize % self.shards.len();
    &self.shards[index]
  }
}

impl<K, V> Cache<K, V> for ShardedCache<K, V>
where
  K: Eq + Hash + Clone + Send + Sync,
  V: Send + Sync,
{
  fn get(&self, cx: &Context, key: &K) -> Result<Arc<V>, Error> {
    self.shard(key).get(cx, key)
  }

  fn put(&self, key: K, value: V) {
    self.shard(&key).put(key, value);
  }

  fn put_with_expiry(&self, key: K, value: V, expires_at: Option<Instant>) {
    self.shard(&key).put_with_expiry(key, value, expires_at);
  }

  fn statistics(&self) -> Statistics {
    self
      .shards
      .iter()
      .map(|shard| shard.statistics())
      .fold(Statistics::default(), |total, stats| total + stats)
  }

  fn shard_statistics(&self) -> Vec<Statistics> {
    self.shards.iter().map(|shard| shard.statistics()).collect()
  }

  fn capacity(&self) -> usize {
    self.shards.first().map_or(0, |shard| shard.capacity())
  }
}
