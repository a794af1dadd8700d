use criterion::{black_box, criterion_group, criterion_main, Criterion};

use stampede::{CacheBuilder, Context};

const KEYSPACE: u64 = 1024;

fn bench_get_hit(c: &mut Criterion) {
  let cache = CacheBuilder::new(KEYSPACE as usize).build().unwrap();
  for i in 0..KEYSPACE {
    cache.put(i, i);
  }

  let cx = Context::new();
  let mut i = 0u64;
  c.bench_function("get_hit", |b| {
    b.iter(|| {
      i = (i + 1) % KEYSPACE;
      black_box(cache.get(&cx, &i).unwrap());
    })
  });
}

fn bench_put_overwrite(c: &mut Criterion) {
  let cache = CacheBuilder::new(KEYSPACE as usize).build().unwrap();

  let mut i = 0u64;
  c.bench_function("put_overwrite", |b| {
    b.iter(|| {
      i = (i + 1) % KEYSPACE;
      cache.put(black_box(i), i);
    })
  });
}

fn bench_read_through_churn(c: &mut Criterion) {
  // Half the keyspace fits, so the workload mixes hits, evictions and
  // loads.
  let cache = CacheBuilder::new((KEYSPACE / 2) as usize)
    .loader(|_cx, key: &u64| Ok((*key, None)))
    .build()
    .unwrap();

  let cx = Context::new();
  let mut i = 0u64;
  c.bench_function("read_through_churn", |b| {
    b.iter(|| {
      i = (i + 1) % KEYSPACE;
      black_box(cache.get(&cx, &i).unwrap());
    })
  });
}

criterion_group!(
  benches,
  bench_get_hit,
  bench_put_overwrite,
  bench_read_through_churn
);
criterion_main!(benches);
