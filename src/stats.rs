use std::ops::{Add, AddAssign};

/// A point-in-time snapshot of a cache's counters.
///
/// Every counter is monotonic over a shard's lifetime and guarded by the
/// same mutex as the data it describes, so a snapshot is always internally
/// consistent. `current_size` is the recency-list length at the moment the
/// snapshot was taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
  /// Gets answered from a live entry.
  pub hits: u64,
  /// Gets that found nothing, including loads that reported not-found.
  pub misses: u64,
  /// Load-function invocations started.
  pub load_attempts: u64,
  /// Load-function invocations that failed with a non-not-found error.
  pub load_failures: u64,
  /// Entries dropped because they were stale on access.
  pub expirations: u64,
  /// Entries dropped to get back under capacity.
  pub evictions: u64,
  /// Entries currently resident.
  pub current_size: usize,
}

// Per-field sum, used to aggregate shard records into cache totals.
impl Add for Statistics {
  type Output = Statistics;

  fn add(self, other: Statistics) -> Statistics {
    Statistics {
      hits: self.hits + other.hits,
      misses: self.misses + other.misses,
      load_attempts: self.load_attempts + other.load_attempts,
      load_failures: self.load_failures + other.load_failures,
      expirations: self.expirations + other.expirations,
      evictions: self.evictions + other.evictions,
      current_size: self.current_size + other.current_size,
    }
  }
}

impl AddAssign for Statistics {
  fn add_assign(&mut self, other: Statistics) {
    *self = *self + other;
  }
}
