#![allow(dead_code)] // each test binary uses its own subset of these helpers

use std::sync::Arc;

use stampede::{Cache, CacheBuilder, Context, Error};

/// Which construction a suite runs against. The interesting suites run both
/// ways: sharding must preserve the single-shard semantics per shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
  Single,
  Sharded,
}

/// A deliberately bad but stable hash: the first byte of the key. Makes it
/// trivial to steer keys onto specific shards in tests.
pub fn first_byte_hash(key: &String) -> i64 {
  key.as_bytes().first().copied().unwrap_or_default() as i64
}

pub fn build_cache<F>(
  flavor: Flavor,
  capacity: usize,
  configure: F,
) -> Arc<dyn Cache<String, String>>
where
  F: FnOnce(CacheBuilder<String, String>) -> CacheBuilder<String, String>,
{
  let mut builder = configure(CacheBuilder::new(capacity));
  if flavor == Flavor::Sharded {
    builder = builder.sharded(2, first_byte_hash);
  }
  Arc::from(builder.build().expect("cache configuration is valid"))
}

pub fn assert_found(cache: &dyn Cache<String, String>, key: &str, expected: &str) {
  let value = cache
    .get(&Context::new(), &key.to_string())
    .unwrap_or_else(|err| panic!("expected {key} to be present, got: {err}"));
  assert_eq!(*value, expected, "wrong value for {key}");
}

pub fn assert_not_found(cache: &dyn Cache<String, String>, key: &str) {
  let err = cache
    .get(&Context::new(), &key.to_string())
    .expect_err("expected a NotFound error");
  assert!(matches!(err, Error::NotFound), "unexpected error: {err}");
}
