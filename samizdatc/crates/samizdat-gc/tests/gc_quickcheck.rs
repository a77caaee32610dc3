//! Property-based tests for the collector (spec section 8's universal
//! liveness and idempotence laws), complementing the concrete scenarios
//! in `gc_correctness.rs` and `gc_spec_tests.rs` with randomized inputs.

use quickcheck_macros::quickcheck;
use samizdat_gc::heap::Heap;
use samizdat_gc::{gc, Gc, HeapObject, ObjectHeader, Roots};
use samizdat_util::ClassId;
use std::ptr::NonNull;

#[repr(C)]
struct Cons {
    header: ObjectHeader,
    value: i64,
    next: Option<Gc<Cons>>,
}

unsafe impl HeapObject for Cons {
    fn header(&self) -> &ObjectHeader {
        &self.header
    }
}

fn header_of(n: Gc<Cons>) -> NonNull<ObjectHeader> {
    unsafe { NonNull::new_unchecked(n.as_ptr() as *mut ObjectHeader) }
}

/// Installs a subscriber so `collect`'s `tracing` spans/events are
/// visible under `cargo test -- --nocapture`; harmless if already set by
/// an earlier test in the same binary.
fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn trace(heap: &Heap, h: NonNull<ObjectHeader>) {
    if heap.mark(h) {
        return;
    }
    let node = unsafe { &*(h.as_ptr() as *const Cons) };
    if let Some(next) = node.next {
        trace(heap, header_of(next));
    }
}

/// A chain of `len` cons cells rooted only by its head survives a
/// collection intact, for any `len`: reachability, not allocation order
/// or count, decides liveness.
#[quickcheck]
fn rooted_chain_of_any_length_survives_one_cycle(len: u8) -> bool {
    init_tracing();
    let len = (len % 64) as usize;
    let heap = Heap::new();
    let roots = Roots::new(128, 128);

    let mut head: Option<Gc<Cons>> = None;
    for i in 0..len {
        head = Some(heap.alloc(Cons { header: ObjectHeader::new(ClassId(0)), value: i as i64, next: head }));
    }
    if let Some(h) = head {
        roots.push(header_of(h)).unwrap();
    }

    gc::collect(&heap, &roots, |h| trace(&heap, h));
    heap.live_count() == len
}

/// Unrooting a chain and collecting again always drives live count to
/// zero, regardless of how long the chain was.
#[quickcheck]
fn unrooted_chain_is_fully_reclaimed(len: u8) -> bool {
    init_tracing();
    let len = (len % 64) as usize;
    let heap = Heap::new();
    let roots = Roots::new(128, 128);

    let mut head: Option<Gc<Cons>> = None;
    for i in 0..len {
        head = Some(heap.alloc(Cons { header: ObjectHeader::new(ClassId(0)), value: i as i64, next: head }));
    }
    let saved = roots.frame_start();
    if let Some(h) = head {
        roots.push(header_of(h)).unwrap();
    }
    gc::collect(&heap, &roots, |h| trace(&heap, h));

    roots.frame_return(saved, None);
    gc::collect(&heap, &roots, |h| trace(&heap, h));
    heap.live_count() == 0
}

/// Running an empty collection cycle any number of times in a row never
/// changes a rooted value's liveness (idempotence of repeated cycles).
#[quickcheck]
fn repeated_cycles_preserve_a_rooted_value(cycles: u8) -> bool {
    init_tracing();
    let cycles = (cycles % 20) as usize;
    let heap = Heap::new();
    let roots = Roots::new(16, 16);

    let n = heap.alloc(Cons { header: ObjectHeader::new(ClassId(0)), value: 9, next: None });
    roots.immortalize(header_of(n)).unwrap();

    for _ in 0..cycles {
        gc::collect(&heap, &roots, |h| trace(&heap, h));
    }
    heap.live_count() == 1 && n.value == 9
}
