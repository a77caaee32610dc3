//! Symbol interner benchmarks.
//!
//! Run with: `cargo bench --bench symbol_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use samizdat_util::symbol::Interner;

fn bench_intern(c: &mut Criterion) {
    let mut group = c.benchmark_group("intern");
    group.throughput(Throughput::Elements(1));

    group.bench_function("intern_new_string", |b| {
        let interner = Interner::new();
        let mut counter = 0u64;
        b.iter(|| {
            counter += 1;
            black_box(interner.intern(&format!("new_string_{counter}")))
        })
    });

    group.bench_function("intern_existing_string", |b| {
        let interner = Interner::new();
        interner.intern("existing_string");
        b.iter(|| black_box(interner.intern("existing_string")))
    });

    group.bench_function("make_anonymous", |b| {
        let interner = Interner::new();
        b.iter(|| black_box(interner.make_anonymous("anon")))
    });

    group.finish();
}

fn bench_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("comparison");
    group.throughput(Throughput::Elements(1));

    let interner = Interner::new();
    let sym1 = interner.intern("hello");
    let sym2 = interner.intern("hello");
    let sym3 = interner.intern("world");

    group.bench_function("symbol_eq_symbol", |b| {
        b.iter(|| {
            black_box(sym1 == sym2);
            black_box(sym1 == sym3);
        })
    });

    group.finish();
}

fn bench_name_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("name_lookup");
    group.throughput(Throughput::Elements(1));

    let interner = Interner::new();
    let sym = interner.intern("test_string");

    group.bench_function("name", |b| b.iter(|| black_box(interner.name(sym))));

    group.finish();
}

fn bench_sorted_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("sorted_rebuild");

    let sizes = [10, 100, 1000, 10000];
    for &size in &sizes {
        group.bench_with_input(BenchmarkId::new("sorted_interned", size), &size, |b, &n| {
            let interner = Interner::new();
            for i in 0..n {
                interner.intern(&format!("sym_{i}"));
            }
            b.iter(|| black_box(interner.sorted_interned()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_intern,
    bench_comparison,
    bench_name_lookup,
    bench_sorted_rebuild,
);

criterion_main!(benches);
