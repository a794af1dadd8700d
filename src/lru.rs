use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ahash::{HashMap, HashMapExt};
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, trace};

use crate::context::Context;
use crate::entry::{CacheEntry, EntryState};
use crate::error::Error;
use crate::list::List;
use crate::loader::{LoadFn, LoadSignal};
use crate::stats::Statistics;
use crate::time::Clock;
use crate::Cache;

/// A single cache shard.
///
/// One mutex guards the key map, the recency list and the counters. The
/// mutex is released across calls into the load function and while waiting
/// on another caller's in-flight load, so loads for distinct keys proceed
/// concurrently; everything observed before a release is re-looked-up by
/// key afterwards.
///
/// Built through [`CacheBuilder`](crate::CacheBuilder).
pub struct LruCache<K, V> {
  state: Mutex<ShardState<K, V>>,
  capacity: usize,
  default_ttl: Option<Duration>,
  clock: Arc<dyn Clock>,
  load_fn: Option<LoadFn<K, V>>,
}

struct ShardState<K, V> {
  by_key: HashMap<K, EntryState<V>>,
  /// Most-recently-used first. Holds keys; the map holds the handles.
  by_access: List<K>,
  stats: Statistics,
}

impl<K, V> fmt::Debug for LruCache<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LruCache")
      .field("capacity", &self.capacity)
      .field("default_ttl", &self.default_ttl)
      .field("has_loader", &self.load_fn.is_some())
      .finish_non_exhaustive()
  }
}

impl<K, V> LruCache<K, V>
where
  K: Eq + Hash + Clone,
{
  pub(crate) fn new(
    capacity: usize,
    default_ttl: Option<Duration>,
    clock: Arc<dyn Clock>,
    load_fn: Option<LoadFn<K, V>>,
  ) -> Self {
    Self {
      state: Mutex::new(ShardState {
        by_key: HashMap::with_capacity(capacity),
        by_access: List::new(),
        stats: Statistics::default(),
      }),
      capacity,
      default_ttl,
      clock,
      load_fn,
    }
  }

  fn default_expiry(&self) -> Option<Instant> {
    self.default_ttl.map(|ttl| self.clock.now() + ttl)
  }

  /// The miss path: consult the load function, coalescing concurrent gets
  /// for the same key onto this one invocation.
  fn load_locked(
    &self,
    guard: &mut MutexGuard<'_, ShardState<K, V>>,
    cx: &Context,
    key: &K,
  ) -> Result<Arc<V>, Error> {
    let Some(load_fn) = &self.load_fn else {
      guard.stats.misses += 1;
      return Err(Error::NotFound);
    };
    let load_fn = Arc::clone(load_fn);

    // Install the loading placeholder so every other get for this key
    // parks on the signal instead of issuing its own load.
    let signal = Arc::new(LoadSignal::new());
    guard
      .by_key
      .insert(key.clone(), EntryState::Loading(Arc::clone(&signal)));
    guard.stats.load_attempts += 1;

    // The mutex is dropped for the duration of the load; other keys keep
    // being served and loaded meanwhile.
    let loaded = MutexGuard::unlocked(guard, || (*load_fn)(cx, key));

    // Fire the signal while the mutex is held again: woken waiters cannot
    // observe the map until the outcome below is fully recorded.
    signal.fire();

    match loaded {
      Ok((value, expiry)) => {
        let value = Arc::new(value);
        let expires_at = expiry.or_else(|| self.default_expiry());
        self.store_locked(guard, key.clone(), Arc::clone(&value), expires_at);
        Ok(value)
      }
      Err(err) => {
        // Drop the placeholder so the next get performs a fresh attempt,
        // but only if it is still this load's own placeholder; a put that
        // raced the load must not be discarded.
        let still_ours = matches!(
          guard.by_key.get(key),
          Some(EntryState::Loading(current)) if Arc::ptr_eq(current, &signal)
        );
        if still_ours {
          guard.by_key.remove(key);
        }
        if matches!(err, Error::NotFound) {
          guard.stats.misses += 1;
        } else {
          guard.stats.load_failures += 1;
          debug!(error = %err, "cache load failed");
        }
        Err(err)
      }
    }
  }

  /// Writes `value` under `key` with an already-resolved expiry, promotes
  /// the entry to most recently used and evicts down to capacity.
  fn store_locked(
    &self,
    guard: &mut MutexGuard<'_, ShardState<K, V>>,
    key: K,
    value: Arc<V>,
    expires_at: Option<Instant>,
  ) {
    let state = &mut **guard;

    if let Some(EntryState::Present(entry)) = state.by_key.get_mut(&key) {
      // Overwrite in place: same list identity, new value and expiry. A
      // pure overwrite cannot grow the list, so no eviction check.
      entry.value = value;
      entry.expires_at = expires_at;
      let handle = entry.handle;
      state.by_access.move_to_front(handle);
      return;
    }

    // Fresh entry, or a loading placeholder being promoted into the list.
    let handle = state.by_access.push_front(key.clone());
    state.by_key.insert(
      key,
      EntryState::Present(CacheEntry {
        value,
        expires_at,
        handle,
      }),
    );
    self.evict_to_capacity(state);
  }

  fn evict_to_capacity(&self, state: &mut ShardState<K, V>) {
    let mut evicted = 0u64;
    while state.by_access.len() > self.capacity {
      let Some(key) = state.by_access.pop_back() else {
        break;
      };
      state.by_key.remove(&key);
      evicted += 1;
    }
    if evicted > 0 {
      state.stats.evictions += evicted;
      trace!(evicted, size = state.by_access.len(), "evicted to capacity");
    }
  }
}

impl<K, V> Cache<K, V> for LruCache<K, V>
where
  K: Eq + Hash + Clone + Send + Sync,
  V: Send + Sync,
{
  fn get(&self, cx: &Context, key: &K) -> Result<Arc<V>, Error> {
    let mut guard = self.state.lock();

    // Wait out any in-flight load for this key. Each wakeup re-examines
    // the map: the load may have failed, the entry may have been evicted
    // or replaced, or a newer load may have started.
    loop {
      let signal = match guard.by_key.get(key) {
        Some(EntryState::Loading(signal)) => Arc::clone(signal),
        _ => break,
      };
      MutexGuard::unlocked(&mut guard, || signal.wait(cx))?;
      if !guard.by_key.contains_key(key) {
        return self.load_locked(&mut guard, cx, key);
      }
    }

    let now = self.clock.now();
    let expired = matches!(
      guard.by_key.get(key),
      Some(EntryState::Present(entry)) if entry.is_expired(now)
    );
    if expired {
      guard.stats.expirations += 1;
      trace!("stale entry dropped on access");
      if let Some(EntryState::Present(entry)) = guard.by_key.remove(key) {
        guard.by_access.remove(entry.handle);
      }
      return self.load_locked(&mut guard, cx, key);
    }

    if let Some(EntryState::Present(entry)) = guard.by_key.get(key) {
      let value = Arc::clone(&entry.value);
      let handle = entry.handle;
      guard.by_access.move_to_front(handle);
      guard.stats.hits += 1;
      return Ok(value);
    }

    self.load_locked(&mut guard, cx, key)
  }

  fn put(&self, key: K, value: V) {
    let mut guard = self.state.lock();
    let expires_at = self.default_expiry();
    self.store_locked(&mut guard, key, Arc::new(value), expires_at);
  }

  fn put_with_expiry(&self, key: K, value: V, expires_at: Option<Instant>) {
    let mut guard = self.state.lock();
    self.store_locked(&mut guard, key, Arc::new(value), expires_at);
  }

  fn statistics(&self) -> Statistics {
    let guard = self.state.lock();
    let mut stats = guard.stats;
    stats.current_size = guard.by_access.len();
    stats
  }

  fn shard_statistics(&self) -> Vec<Statistics> {
    vec![self.statistics()]
  }

  fn capacity(&self) -> usize {
    self.capacity
  }
}
