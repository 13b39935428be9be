//! Criterion micro-benchmarks for arena allocation, churn, and validation.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use palisade_arena::Arena;
use palisade_bench::{churn_workload, fragmented_arena, run_churn};
use palisade_pool::Pool;

/// First-fit allocation into a heavily fragmented arena: the scan must
/// step over many holes that are too small before finding a fit.
fn bench_first_fit_fragmented(c: &mut Criterion) {
    c.bench_function("allocate/first_fit_fragmented", |b| {
        b.iter_batched(
            || fragmented_arena(64 * 1024, 256),
            |mut arena| {
                // Holes are 16 bytes; a 64-byte request skips all of them.
                let offset = arena.allocate(64).unwrap();
                black_box(offset)
            },
            BatchSize::SmallInput,
        );
    });
}

/// A full alloc/free churn workload against a fresh arena.
fn bench_churn(c: &mut Criterion) {
    let ops = churn_workload(42, 1000);
    c.bench_function("churn/1000_ops", |b| {
        b.iter_batched(
            || Arena::new(64 * 1024).unwrap(),
            |mut arena| {
                let applied = run_churn(&mut arena, &ops);
                black_box(applied)
            },
            BatchSize::SmallInput,
        );
    });
}

/// The diagnostic sentinel walk over a fragmented arena.
fn bench_valid_walk(c: &mut Criterion) {
    let arena = fragmented_arena(64 * 1024, 256);
    c.bench_function("valid/fragmented_walk", |b| {
        b.iter(|| black_box(arena.valid()));
    });
}

/// Typed pool allocate/deallocate round trip.
fn bench_pool_round_trip(c: &mut Criterion) {
    c.bench_function("pool/round_trip_i32x16", |b| {
        b.iter_batched(
            || Pool::<i32>::new(4096).unwrap(),
            |mut pool| {
                let ptr = pool.allocate(16).unwrap();
                pool.deallocate(ptr, 16);
                black_box(pool.valid())
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_first_fit_fragmented,
    bench_churn,
    bench_valid_walk,
    bench_pool_round_trip,
);
criterion_main!(benches);
