mod common;

use stampede::Statistics;

use common::{assert_found, assert_not_found, build_cache, Flavor};

// Two shards keyed by the first byte: "a…" keys land on one shard, "b…"
// keys on the other, each shard with the full configured capacity.

#[test]
fn shards_fill_and_evict_independently() {
  let cache = build_cache(Flavor::Sharded, 10, |builder| builder);

  for i in 0..12 {
    cache.put(format!("a{i:02}"), i.to_string());
  }
  for i in 0..10 {
    cache.put(format!("b{i:02}"), i.to_string());
  }

  // The a-shard overflowed twice; its two oldest keys are gone. The
  // b-shard never overflowed, so filling it evicted nothing.
  assert_not_found(cache.as_ref(), "a00");
  assert_not_found(cache.as_ref(), "a01");
  for i in 2..12 {
    assert_found(cache.as_ref(), &format!("a{i:02}"), &i.to_string());
  }
  for i in 0..10 {
    assert_found(cache.as_ref(), &format!("b{i:02}"), &i.to_string());
  }

  assert_eq!(
    cache.statistics(),
    Statistics {
      hits: 20,
      misses: 2,
      evictions: 2,
      current_size: 20,
      ..Statistics::default()
    }
  );
}

#[test]
fn recency_is_tracked_per_shard() {
  let cache = build_cache(Flavor::Sharded, 3, |builder| builder);

  cache.put("a1".to_string(), "1".to_string());
  cache.put("a2".to_string(), "2".to_string());
  cache.put("a3".to_string(), "3".to_string());

  // Touch a1 so a2 becomes that shard's eviction candidate; traffic on the
  // other shard must not influence the choice.
  assert_found(cache.as_ref(), "a1", "1");
  cache.put("b1".to_string(), "other shard".to_string());
  cache.put("a4".to_string(), "4".to_string());

  assert_not_found(cache.as_ref(), "a2");
  assert_found(cache.as_ref(), "a1", "1");
  assert_found(cache.as_ref(), "a3", "3");
  assert_found(cache.as_ref(), "a4", "4");
  assert_found(cache.as_ref(), "b1", "other shard");
  assert_eq!(cache.statistics().evictions, 1);
}

#[test]
fn aggregate_statistics_are_the_per_shard_sum() {
  let cache = build_cache(Flavor::Sharded, 10, |builder| builder);

  cache.put("apple".to_string(), "1".to_string());
  cache.put("banana".to_string(), "2".to_string());
  assert_found(cache.as_ref(), "apple", "1");
  assert_found(cache.as_ref(), "banana", "2");
  assert_not_found(cache.as_ref(), "cherry");

  let totals = cache.statistics();
  let shards = cache.shard_statistics();
  assert_eq!(shards.len(), 2);
  assert_eq!(
    shards
      .iter()
      .copied()
      .fold(Statistics::default(), |sum, stats| sum + stats),
    totals
  );

  // Both shards saw traffic.
  assert!(shards.iter().all(|stats| stats.current_size > 0));
}
