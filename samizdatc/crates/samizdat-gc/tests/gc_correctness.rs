//! Black-box correctness tests for the heap and collector, exercised
//! only through the public `samizdat_gc` API (no access to private
//! fields), covering spec section 8's GC liveness property.

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

fn trace(heap: &Heap, h: NonNull<ObjectHeader>) {
    if heap.mark(h) {
        return;
    }
    let node = unsafe { &*(h.as_ptr() as *const Cons) };
    if let Some(next) = node.next {
        trace(heap, header_of(next));
    }
}

#[test]
fn scenario_f_gc_liveness() {
    // spec section 8, Scenario F: allocate many values rooted only by a
    // nested frame, return just one of them, force a collection — only
    // the returned value should survive.
    let heap = Heap::new();
    let roots = Roots::new(64, 64);

    let saved = roots.frame_start();
    let mut last = None;
    for i in 0..50 {
        let n = heap.alloc(Cons { header: ObjectHeader::new(ClassId(0)), value: i, next: None });
        roots.push(header_of(n)).unwrap();
        last = Some(n);
    }
    let survivor = last.unwrap();
    roots.frame_return(saved, Some(header_of(survivor)));

    assert_eq!(roots.stack_depth(), 1);
    gc::collect(&heap, &roots, |h| trace(&heap, h));

    assert_eq!(heap.live_count(), 1);
    assert_eq!(survivor.value, 49);
}

#[test]
fn immortals_survive_every_cycle() {
    let heap = Heap::new();
    let roots = Roots::new(64, 64);

    let immortal = heap.alloc(Cons { header: ObjectHeader::new(ClassId(0)), value: 1, next: None });
    roots.immortalize(header_of(immortal)).unwrap();

    for _ in 0..5 {
        let garbage = heap.alloc(Cons { header: ObjectHeader::new(ClassId(0)), value: 2, next: None });
        drop(garbage);
        gc::collect(&heap, &roots, |h| trace(&heap, h));
    }

    assert_eq!(heap.live_count(), 1);
    assert_eq!(immortal.value, 1);
}

#[test]
fn reachable_through_chain_of_owned_references_survives() {
    let heap = Heap::new();
    let roots = Roots::new(64, 64);

    let tail = heap.alloc(Cons { header: ObjectHeader::new(ClassId(0)), value: 3, next: None });
    let mid = heap.alloc(Cons { header: ObjectHeader::new(ClassId(0)), value: 2, next: Some(tail) });
    let head = heap.alloc(Cons { header: ObjectHeader::new(ClassId(0)), value: 1, next: Some(mid) });
    roots.push(header_of(head)).unwrap();

    gc::collect(&heap, &roots, |h| trace(&heap, h));
    assert_eq!(heap.live_count(), 3);
}

#[test]
fn cycle_through_owned_references_does_not_leak_or_crash() {
    // Values can form cycles (spec section 9); the collector must not
    // infinite-loop tracing one.
    let heap = Heap::new();
    let roots = Roots::new(64, 64);

    let a = heap.alloc(Cons { header: ObjectHeader::new(ClassId(0)), value: 1, next: None });
    let b = heap.alloc(Cons { header: ObjectHeader::new(ClassId(0)), value: 2, next: Some(a) });
    // SAFETY: test-only back-patch to close the cycle a -> b -> a.
    unsafe {
        let a_mut = a.as_ptr();
        (*a_mut).next = Some(b);
    }
    roots.push(header_of(a)).unwrap();

    gc::collect(&heap, &roots, |h| trace(&heap, h));
    assert_eq!(heap.live_count(), 2);

    roots.frame_return(roots.frame_start(), None);
    gc::collect(&heap, &roots, |h| trace(&heap, h));
    assert_eq!(heap.live_count(), 0);
}

#[test]
fn heap_validates_after_many_cycles() {
    let heap = Heap::new();
    let roots = Roots::new(64, 64);
    for round in 0..10 {
        let n = heap.alloc(Cons { header: ObjectHeader::new(ClassId(0)), value: round, next: None });
        if round % 2 == 0 {
            roots.push(header_of(n)).unwrap();
        }
        gc::collect(&heap, &roots, |h| trace(&heap, h));
    }
    assert!(heap.validate().is_ok());
}
