use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// A source of "now".
///
/// The cache compares entry expiries against this clock, so injecting a
/// [`MockClock`] makes every time-based behavior deterministic in tests.
pub trait Clock: Send + Sync {
  /// The current instant.
  fn now(&self) -> Instant;
}

/// The wall clock used when no other clock is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> Instant {
    Instant::now()
  }
}

/// A manually advanced clock for deterministic tests.
///
/// Clones share the same state: keep one handle to drive time and give a
/// clone to the cache builder.
#[derive(Debug, Clone)]
pub struct MockClock {
  start: Instant,
  elapsed: Arc<Mutex<Duration>>,
}

impl MockClock {
  pub fn new() -> Self {
    Self {
      start: Instant::now(),
      elapsed: Arc::new(Mutex::new(Duration::ZERO)),
    }
  }

  /// Advances the clock by `duration` without sleeping.
  pub fn advance(&self, duration: Duration) {
    *self.elapsed.lock() += duration;
  }
}

impl Default for MockClock {
  fn default() -> Self {
    Self::new()
  }
}

impl Clock for MockClock {
  fn now(&self) -> Instant {
    self.start + *self.elapsed.lock()
  }
}
