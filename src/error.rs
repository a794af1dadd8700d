use thiserror::Error;

/// Errors surfaced by cache operations.
#[derive(Debug, Error)]
pub enum Error {
  /// The key has no value and no load function could fetch one, or the
  /// load function itself reported that the value does not exist. Counted
  /// as a miss.
  #[error("cache entry not found")]
  NotFound,

  /// The load function failed with something other than [`Error::NotFound`].
  /// The underlying error is carried verbatim. Counted as a load failure.
  #[error("cache load failed: {0}")]
  Load(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// The caller's [`Context`](crate::Context) was canceled while it was
  /// blocked on another caller's in-flight load. Not counted; the load
  /// keeps running for its originator.
  #[error("cache get canceled")]
  Canceled,
}

impl Error {
  /// Wraps an arbitrary error as a load failure.
  pub fn load(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
    Error::Load(err.into())
  }
}

/// Errors surfaced when building a cache. Construction is the only place
/// configuration is validated; operations never fail with these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
  /// The cache was configured with a capacity of zero.
  #[error("cache capacity cannot be zero")]
  ZeroCapacity,

  /// Sharding was requested with a shard count of zero.
  #[error("shard count cannot be zero")]
  ZeroShards,
}
