use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, Thread, ThreadId};

use parking_lot::Mutex;

/// A cancellation handle passed to [`get`](crate::Cache::get).
///
/// Cloning is cheap and clones share the same state, so one caller can hand
/// a context to a blocked get on another thread and cancel it from here.
/// Cancellation only affects waiting: a get blocked on another caller's
/// in-flight load wakes up and returns [`Error::Canceled`], while the load
/// itself keeps running for the caller that started it.
///
/// [`Error::Canceled`]: crate::Error::Canceled
#[derive(Debug, Clone, Default)]
pub struct Context {
  inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
  canceled: AtomicBool,
  watchers: Mutex<Vec<Thread>>,
}

impl Context {
  /// A fresh, not-yet-canceled context.
  pub fn new() -> Self {
    Self::default()
  }

  /// Marks the context canceled and wakes every waiter blocked on it.
  /// Idempotent.
  pub fn cancel(&self) {
    self.inner.canceled.store(true, Ordering::SeqCst);
    for thread in self.inner.watchers.lock().drain(..) {
      thread.unpark();
    }
  }

  pub fn is_canceled(&self) -> bool {
    self.inner.canceled.load(Ordering::SeqCst)
  }

  /// Registers the current thread to be unparked on cancellation. The
  /// registration lasts until the returned guard drops.
  pub(crate) fn watch(&self) -> Watch<'_> {
    let current = thread::current();
    let id = current.id();
    self.inner.watchers.lock().push(current);
    Watch { context: self, id }
  }
}

pub(crate) struct Watch<'a> {
  context: &'a Context,
  id: ThreadId,
}

impl Drop for Watch<'_> {
  fn drop(&mut self) {
    self
      .context
      .inner
      .watchers
      .lock()
      .retain(|thread| thread.id() != self.id);
  }
}
