//! Benchmark for HashTrieMap vs standard HashMap.
//!
//! Compares the performance of hashtrie's HashTrieMap against Rust's standard
//! HashMap for common operations, and measures the cost of the identity
//! provider against the standard one.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hashtrie::persistent::HashTrieMap;
use hashtrie::provider::IdentityHasher;
use std::collections::HashMap;
use std::hint::black_box;
use std::sync::Arc;

// =============================================================================
// insert Benchmark
// =============================================================================

fn benchmark_insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("insert");

    for size in [1_000, 10_000, 100_000] {
        group.bench_with_input(
            BenchmarkId::new("HashTrieMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut map = HashTrieMap::new();
                    for index in 0..size {
                        map = map.insert(black_box(index), black_box(index * 2));
                    }
                    black_box(map)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("HashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut map = HashMap::new();
                    for index in 0..size {
                        map.insert(black_box(index), black_box(index * 2));
                    }
                    black_box(map)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// get Benchmark
// =============================================================================

fn benchmark_get(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("get");

    for size in [100, 1_000, 10_000] {
        let trie_map: HashTrieMap<i32, i32> = (0..size).map(|index| (index, index * 2)).collect();
        let standard_map: HashMap<i32, i32> = (0..size).map(|index| (index, index * 2)).collect();

        group.bench_with_input(
            BenchmarkId::new("HashTrieMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut sum = 0;
                    for key in 0..size {
                        if let Some(&value) = trie_map.get(&black_box(key)) {
                            sum += value;
                        }
                    }
                    black_box(sum)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("HashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut sum = 0;
                    for key in 0..size {
                        if let Some(&value) = standard_map.get(&black_box(key)) {
                            sum += value;
                        }
                    }
                    black_box(sum)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// remove Benchmark
// =============================================================================

fn benchmark_remove(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("remove");

    for size in [1_000, 10_000] {
        let trie_map: HashTrieMap<i32, i32> = (0..size).map(|index| (index, index)).collect();

        group.bench_with_input(
            BenchmarkId::new("HashTrieMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut map = trie_map.clone();
                    for key in 0..size {
                        map = map.remove(&black_box(key));
                    }
                    black_box(map)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("HashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter_batched(
                    || (0..size).map(|index| (index, index)).collect::<HashMap<i32, i32>>(),
                    |mut map| {
                        for key in 0..size {
                            map.remove(&black_box(key));
                        }
                        black_box(map)
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

// =============================================================================
// Snapshot Benchmark (persistent update of a shared map)
// =============================================================================

fn benchmark_snapshot_update(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("snapshot_update");

    for size in [1_000, 100_000] {
        let trie_map: HashTrieMap<i32, i32> = (0..size).map(|index| (index, index)).collect();
        let standard_map: HashMap<i32, i32> = (0..size).map(|index| (index, index)).collect();

        group.bench_with_input(
            BenchmarkId::new("HashTrieMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| black_box(trie_map.insert(black_box(size / 2), -1)));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("HashMap clone", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut copy = standard_map.clone();
                    copy.insert(black_box(size / 2), -1);
                    black_box(copy)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// equality and hash Benchmark
// =============================================================================

fn benchmark_equality(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("equality");

    for size in [1_000, 10_000] {
        let forward: HashTrieMap<i32, i32> = (0..size).map(|index| (index, index)).collect();
        let backward: HashTrieMap<i32, i32> = (0..size).rev().map(|index| (index, index)).collect();

        group.bench_with_input(BenchmarkId::new("equals", size), &size, |bencher, _| {
            bencher.iter(|| black_box(forward == backward));
        });

        group.bench_with_input(
            BenchmarkId::new("structural_hash", size),
            &size,
            |bencher, _| {
                bencher.iter(|| black_box(forward.structural_hash()));
            },
        );
    }

    group.finish();
}

// =============================================================================
// Provider Benchmark
// =============================================================================

fn benchmark_identity_provider(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("identity_provider");
    let size = 10_000;

    let keys: Vec<Arc<str>> = (0..size).map(|index| Arc::from(format!("key{index}"))).collect();
    let identity_map = keys.iter().enumerate().fold(
        HashTrieMap::with_provider(IdentityHasher::new()),
        |map, (index, key)| map.insert(Arc::clone(key), index),
    );
    let standard_map: HashTrieMap<Arc<str>, usize> = keys
        .iter()
        .enumerate()
        .map(|(index, key)| (Arc::clone(key), index))
        .collect();

    group.bench_function("IdentityHasher get", |bencher| {
        bencher.iter(|| {
            let mut sum = 0;
            for key in &keys {
                sum += identity_map.get(black_box(key)).copied().unwrap_or(0);
            }
            black_box(sum)
        });
    });

    group.bench_function("StandardProvider get", |bencher| {
        bencher.iter(|| {
            let mut sum = 0;
            for key in &keys {
                sum += standard_map.get(black_box(key)).copied().unwrap_or(0);
            }
            black_box(sum)
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_insert,
    benchmark_get,
    benchmark_remove,
    benchmark_snapshot_update,
    benchmark_equality,
    benchmark_identity_provider
);
criterion_main!(benches);
