use std::sync::Arc;
use std::time::Instant;

use crate::list;
use crate::loader::LoadSignal;

/// The state of a key in a shard's map.
///
/// A key is reachable from the map iff it is either listed (`Present`) or
/// mid-load (`Loading`); the enum makes any other combination
/// unrepresentable.
#[derive(Debug)]
pub(crate) enum EntryState<V> {
  /// A load is in flight for this key. Only the signal is observable;
  /// waiters re-examine the map once it fires. Not in the recency list.
  Loading(Arc<LoadSignal>),
  /// A live value, always present in the recency list under its handle.
  Present(CacheEntry<V>),
}

#[derive(Debug)]
pub(crate) struct CacheEntry<V> {
  pub(crate) value: Arc<V>,
  /// Absolute expiry; `None` never expires.
  pub(crate) expires_at: Option<Instant>,
  pub(crate) handle: list::Handle,
}

impl<V> CacheEntry<V> {
  /// An entry is stale once `now` is strictly past its expiry.
  pub(crate) fn is_expired(&self, now: Instant) -> bool {
    matches!(self.expires_at, Some(expires_at) if now > expires_at)
  }
}
