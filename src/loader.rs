use std::sync::Arc;
use std::thread::{self, Thread};
use std::time::Instant;

use parking_lot::Mutex;

use crate::context::Context;
use crate::error::Error;

/// A read-through load function.
///
/// Invoked with the originating caller's context whenever a get misses. An
/// expiry of `None` in the success value means "apply the cache's default
/// TTL if one is configured, otherwise never expire". Returning
/// [`Error::NotFound`] signals that the value does not exist; it is counted
/// as a miss rather than a load failure. Any other error is surfaced to the
/// caller verbatim.
///
/// The function must be safe to call concurrently for distinct keys. The
/// cache guarantees at most one invocation is in flight per key.
pub type LoadFn<K, V> =
  Arc<dyn Fn(&Context, &K) -> Result<(V, Option<Instant>), Error> + Send + Sync>;

/// A one-shot broadcast marking a load in flight for a single key.
///
/// The loading caller fires the signal exactly once, while holding the
/// shard mutex, after the load's outcome has been recorded in the map.
/// Waiters park until the signal fires or their own context is canceled,
/// then re-examine the map; the signal itself carries no result.
#[derive(Debug)]
pub(crate) struct LoadSignal {
  inner: Mutex<SignalState>,
}

#[derive(Debug)]
struct SignalState {
  fired: bool,
  waiters: Vec<Thread>,
}

impl LoadSignal {
  pub(crate) fn new() -> Self {
    Self {
      inner: Mutex::new(SignalState {
        fired: false,
        waiters: Vec::new(),
      }),
    }
  }

  /// Fires the signal and wakes every parked waiter. Idempotent.
  pub(crate) fn fire(&self) {
    let mut inner = self.inner.lock();
    inner.fired = true;
    for waiter in inner.waiters.drain(..) {
      waiter.unpark();
    }
  }

  /// Blocks the calling thread until the signal fires or `cx` is canceled.
  ///
  /// Wakeups cannot be lost: the thread registers with the signal before
  /// checking for cancellation and parking, and both conditions are
  /// re-checked after every wakeup, so a fire or cancel that races the
  /// registration at worst causes one extra pass through the loop. Parking
  /// may also return spuriously, which the loop absorbs the same way.
  pub(crate) fn wait(&self, cx: &Context) -> Result<(), Error> {
    loop {
      {
        let mut inner = self.inner.lock();
        if inner.fired {
          return Ok(());
        }
        inner.waiters.push(thread::current());
      }

      let watch = cx.watch();
      if cx.is_canceled() {
        return Err(Error::Canceled);
      }
      thread::park();
      drop(watch);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fire_wakes_parked_waiters() {
    let signal = Arc::new(LoadSignal::new());
    let cx = Context::new();

    let waiters: Vec<_> = (0..4)
      .map(|_| {
        let signal = Arc::clone(&signal);
        let cx = cx.clone();
        thread::spawn(move || signal.wait(&cx))
      })
      .collect();

    signal.fire();
    for waiter in waiters {
      assert!(waiter.join().unwrap().is_ok());
    }
  }

  #[test]
  fn wait_after_fire_returns_immediately() {
    let signal = LoadSignal::new();
    signal.fire();
    assert!(signal.wait(&Context::new()).is_ok());
  }

  #[test]
  fn canceled_context_interrupts_wait() {
    let signal = Arc::new(LoadSignal::new());
    let cx = Context::new();

    let waiter = {
      let signal = Arc::clone(&signal);
      let cx = cx.clone();
      thread::spawn(move || signal.wait(&cx))
    };

    cx.cancel();
    assert!(matches!(waiter.join().unwrap(), Err(Error::Canceled)));
  }
}
