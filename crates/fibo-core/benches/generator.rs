//! Criterion benchmarks for the memoized generator.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use fibo_core::{count_ordinals_in_range, Generator, MemoryCache, NullCache, Number};

fn bench_generator(c: &mut Criterion) {
    let ns: Vec<u64> = vec![100, 1_000, 10_000];

    let mut group = c.benchmark_group("ColdCache");
    for &n in &ns {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| Generator::new(Arc::new(MemoryCache::new())).compute(n));
        });
    }
    group.finish();

    let mut group = c.benchmark_group("WarmCache");
    for &n in &ns {
        let gen = Generator::new(Arc::new(MemoryCache::new()));
        gen.compute(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| gen.compute(n));
        });
    }
    group.finish();

    let mut group = c.benchmark_group("NoCache");
    for &n in &ns {
        let gen = Generator::new(Arc::new(NullCache::new()));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| gen.compute(n));
        });
    }
    group.finish();
}

fn bench_range(c: &mut Criterion) {
    let high = fibo_core::fibonacci(5_000);
    c.bench_function("count_ordinals_in_range/F(5000)", |b| {
        b.iter(|| count_ordinals_in_range(&Number::zero(), &high));
    });
}

criterion_group!(benches, bench_generator, bench_range);
criterion_main!(benches);
