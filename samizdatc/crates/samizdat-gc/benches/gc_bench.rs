//! Allocation and collection benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use samizdat_gc::{Gc, HeapObject, ObjectHeader, Roots};
use samizdat_gc::heap::Heap;
use samizdat_util::ClassId;

#[repr(C)]
struct Node {
    header: ObjectHeader,
    value: i64,
}

unsafe impl HeapObject for Node {
    fn header(&self) -> &ObjectHeader {
        &self.header
    }
}

fn bench_alloc(c: &mut Criterion) {
    c.bench_function("heap_alloc", |b| {
        let heap = Heap::new();
        b.iter(|| {
            let n: Gc<Node> = heap.alloc(Node { header: ObjectHeader::new(ClassId(0)), value: 1 });
            black_box(n);
        })
    });
}

fn bench_collect(c: &mut Criterion) {
    c.bench_function("gc_collect_1000_garbage", |b| {
        b.iter(|| {
            let heap = Heap::new();
            let roots = Roots::new(16, 16);
            for _ in 0..1000 {
                let n: Gc<Node> =
                    heap.alloc(Node { header: ObjectHeader::new(ClassId(0)), value: 1 });
                black_box(n);
            }
            samizdat_gc::gc::collect(&heap, &roots, |h| {
                heap.mark(h);
            });
        })
    });
}

criterion_group!(benches, bench_alloc, bench_collect);
criterion_main!(benches);
