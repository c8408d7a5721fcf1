//! Combinator benchmarks.
//!
//! Measures the per-step cost of the explicit-stack repetition combinators
//! on a wide tree and on a dense cyclic relation.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use stx_strategies::{Seq, Strategy, fix_set, limit, repeat};

/// Children of `n` in a complete tree of the given fan-out, cut off at `max`.
fn tree(fan_out: u64, max: u64) -> Strategy<(), u64, u64> {
    Strategy::new("tree", move |_, n: u64| {
        let first = n * fan_out + 1;
        if first > max {
            Seq::empty()
        } else {
            Seq::values(first..(first + fan_out).min(max + 1))
        }
    })
}

/// `n -> {n + 1, n + 2} mod size`: every value is reachable from every other.
fn ring(size: u64) -> Strategy<(), u64, u64> {
    Strategy::new("ring", move |_, n: u64| Seq::values([(n + 1) % size, (n + 2) % size]))
}

fn bench_repeat(c: &mut Criterion) {
    let mut group = c.benchmark_group("repeat");
    for max in [1_000u64, 10_000, 100_000] {
        let strategy = repeat(tree(4, max));
        group.bench_with_input(BenchmarkId::from_parameter(max), &max, |b, _| {
            b.iter(|| strategy.eval(&(), black_box(0)).count());
        });
    }
    group.finish();
}

fn bench_fix_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("fix_set");
    for size in [100u64, 1_000, 10_000] {
        let strategy = fix_set(ring(size));
        group.bench_with_input(BenchmarkId::new("ring", size), &size, |b, _| {
            b.iter(|| strategy.eval(&(), black_box(0)).count());
        });
        let first = limit(1, fix_set(tree(4, size)));
        group.bench_with_input(BenchmarkId::new("first_leaf", size), &size, |b, _| {
            b.iter(|| first.eval(&(), black_box(0)).count());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_repeat, bench_fix_set);
criterion_main!(benches);
