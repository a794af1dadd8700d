use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::context::Context;
use crate::error::{BuildError, Error};
use crate::loader::LoadFn;
use crate::lru::LruCache;
use crate::sharded::{HashFn, ShardedCache};
use crate::time::{Clock, SystemClock};
use crate::Cache;

/// Assembles a cache from a capacity and the recognized options.
///
/// ```
/// use stampede::{Cache, CacheBuilder, Context};
///
/// let cache = CacheBuilder::new(100)
///   .loader(|_cx, key: &String| Ok((key.to_uppercase(), None)))
///   .build()
///   .unwrap();
///
/// let cx = Context::new();
/// assert_eq!(*cache.get(&cx, &"foo".to_string()).unwrap(), "FOO");
/// ```
pub struct CacheBuilder<K, V> {
  capacity: usize,
  default_ttl: Option<Duration>,
  clock: Arc<dyn Clock>,
  load_fn: Option<LoadFn<K, V>>,
  sharding: Option<Sharding<K>>,
}

struct Sharding<K> {
  count: usize,
  hash_fn: HashFn<K>,
}

impl<K, V> fmt::Debug for CacheBuilder<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheBuilder")
      .field("capacity", &self.capacity)
      .field("default_ttl", &self.default_ttl)
      .field("has_loader", &self.load_fn.is_some())
      .field("shards", &self.sharding.as_ref().map(|s| s.count))
      .finish_non_exhaustive()
  }
}

impl<K, V> CacheBuilder<K, V>
where
  K: Eq + Hash + Clone + Send + Sync + 'static,
  V: Send + Sync + 'static,
{
  /// Starts a builder for a cache holding at most `capacity` entries per
  /// shard.
  pub fn new(capacity: usize) -> Self {
    Self {
      capacity,
      default_ttl: None,
      clock: Arc::new(SystemClock),
      load_fn: None,
      sharding: None,
    }
  }

  /// Sets the default TTL applied when a put or a load supplies no expiry
  /// of its own. `Duration::ZERO` disables the default.
  pub fn default_ttl(mut self, ttl: Duration) -> Self {
    self.default_ttl = (ttl > Duration::ZERO).then_some(ttl);
    self
  }

  /// Injects the time source. Defaults to [`SystemClock`].
  pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
    self.clock = Arc::new(clock);
    self
  }

  /// Sets the read-through load function consulted when a get misses.
  /// Without one, misses fail with [`Error::NotFound`].
  pub fn loader<F>(mut self, load_fn: F) -> Self
  where
    F: Fn(&Context, &K) -> Result<(V, Option<Instant>), Error> + Send + Sync + 'static,
  {
    self.load_fn = Some(Arc::new(load_fn));
    self
  }

  /// Splits the cache into `count` shards routed by `hash_fn` (see
  /// [`default_hash`](crate::default_hash) for a ready-made one). Each
  /// shard is built with the full configured capacity.
  pub fn sharded<F>(mut self, count: usize, hash_fn: F) -> Self
  where
    F: Fn(&K) -> i64 + Send + Sync + 'static,
  {
    self.sharding = Some(Sharding {
      count,
      hash_fn: Arc::new(hash_fn),
    });
    self
  }

  /// Validates the configuration and builds the cache: sharded when two or
  /// more shards were requested, a single LRU cache otherwise.
  pub fn build(self) -> Result<Box<dyn Cache<K, V>>, BuildError> {
    if self.capacity == 0 {
      return Err(BuildError::ZeroCapacity);
    }
    if let Some(sharding) = &self.sharding {
      if sharding.count == 0 {
        return Err(BuildError::ZeroShards);
      }
    }

    match self.sharding {
      Some(sharding) if sharding.count >= 2 => {
        let shards = (0..sharding.count)
          .map(|_| {
            LruCache::new(
              self.capacity,
              self.default_ttl,
              Arc::clone(&self.clock),
              self.load_fn.clone(),
            )
          })
          .collect();
        Ok(Box::new(ShardedCache::new(shards, sharding.hash_fn)))
      }
      _ => Ok(Box::new(LruCache::new(
        self.capacity,
        self.default_ttl,
        self.clock,
        self.load_fn,
      ))),
    }
  }
}
