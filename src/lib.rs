//! A fixed-capacity, in-memory cache with read-through loading, stampede
//! protection, TTL expiration and least-recently-used eviction, optionally
//! split into independent shards.
//!
//! Concurrent gets for the same missing key coalesce onto a single call to
//! the load function: one caller loads while the rest park on a one-shot
//! signal, honoring per-caller cancellation through [`Context`]. Recency is
//! a total order maintained in O(1) by an arena-backed [`list`], and every
//! counter lives under the same per-shard mutex as the data it describes,
//! so [`Statistics`] snapshots are always consistent.
//!
//! Caches are assembled through [`CacheBuilder`]:
//!
//! ```
//! use std::time::Duration;
//! use stampede::{Cache, CacheBuilder, Context};
//!
//! let cache = CacheBuilder::new(1024)
//!   .default_ttl(Duration::from_secs(60))
//!   .loader(|_cx, key: &u32| Ok((key.to_string(), None)))
//!   .build()
//!   .unwrap();
//!
//! let cx = Context::new();
//! assert_eq!(*cache.get(&cx, &7).unwrap(), "7");
//! assert_eq!(cache.statistics().load_attempts, 1);
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod list;
pub mod stats;
pub mod time;

mod entry;
mod loader;
mod lru;
mod sharded;

use std::sync::Arc;
use std::time::Instant;

pub use builder::CacheBuilder;
pub use context::Context;
pub use error::{BuildError, Error};
pub use loader::LoadFn;
pub use lru::LruCache;
pub use sharded::{default_hash, HashFn, ShardedCache};
pub use stats::Statistics;
pub use time::{Clock, MockClock, SystemClock};

/// The operations shared by [`LruCache`] and [`ShardedCache`].
///
/// [`CacheBuilder::build`] returns whichever variant the configuration
/// calls for behind this trait.
pub trait Cache<K, V>: Send + Sync {
  /// Retrieves the value for `key`.
  ///
  /// A hit promotes the entry to most recently used. A miss consults the
  /// load function when one is configured, coalescing with any load
  /// already in flight for the key, and fails with [`Error::NotFound`]
  /// otherwise. A stale entry is dropped on access and treated as a miss.
  fn get(&self, cx: &Context, key: &K) -> Result<Arc<V>, Error>;

  /// Writes `key`, overwriting any existing entry and marking it most
  /// recently used. The default TTL is applied when one is configured.
  /// Never fails; may evict.
  fn put(&self, key: K, value: V);

  /// Like [`put`](Cache::put), but with an explicit absolute expiry.
  /// `None` means the entry never expires, overriding the default TTL.
  fn put_with_expiry(&self, key: K, value: V, expires_at: Option<Instant>);

  /// A snapshot of the counters, aggregated across shards.
  fn statistics(&self) -> Statistics;

  /// Per-shard counter snapshots in shard order. A single-shard cache
  /// reports one record, so the result always has at least one element.
  fn shard_statistics(&self) -> Vec<Statistics>;

  /// The configured capacity of each shard.
  fn capacity(&self) -> usize;
}
