//! # Slot Arena Benchmark
//!
//! Measures insert/remove churn and lookups through generational handles.
//!
//! Run with: `cargo bench --package trellis_core`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trellis_core::{Affine2, SlotArena, Vec2};

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("arena_insert");

    for count in [1_000, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut arena = SlotArena::with_capacity(count);
                for i in 0..count {
                    black_box(arena.insert(i));
                }
                arena.len()
            });
        });
    }

    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    c.bench_function("arena_churn_10k", |b| {
        let mut arena = SlotArena::with_capacity(10_000);
        let mut handles: Vec<_> = (0..10_000).map(|i| arena.insert(i)).collect();

        b.iter(|| {
            for handle in &mut handles {
                let value = arena.remove(*handle).unwrap_or_default();
                *handle = arena.insert(value + 1);
            }
        });
    });
}

fn bench_lookup(c: &mut Criterion) {
    let mut arena = SlotArena::with_capacity(100_000);
    let handles: Vec<_> = (0..100_000u32).map(|i| arena.insert(i)).collect();

    c.bench_function("arena_lookup_100k", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for handle in &handles {
                if let Some(v) = arena.get(*handle) {
                    sum += u64::from(*v);
                }
            }
            black_box(sum)
        });
    });
}

fn bench_transform_compose(c: &mut Criterion) {
    c.bench_function("affine_compose_depth_16", |b| {
        b.iter(|| {
            let mut acc = Affine2::IDENTITY;
            for depth in 0..16 {
                let f = depth as f32;
                acc = acc
                    * Affine2::translation(Vec2::new(f, f * 0.5))
                    * Affine2::rotation(black_box(f * 3.0))
                    * Affine2::scale(Vec2::new(1.01, 0.99));
            }
            acc.apply(black_box(Vec2::new(1.0, 1.0)))
        });
    });
}

criterion_group!(
    benches,
    bench_insert,
    bench_churn,
    bench_lookup,
    bench_transform_compose
);
criterion_main!(benches);
