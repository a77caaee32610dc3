//! Tests tied directly to invariants spec section 3.1 and 4.1 state in
//! words, rather than to any particular internal representation.

use samizdat_gc::heap::Heap;
use samizdat_gc::object::header::ObjectHeader;
use samizdat_gc::{Gc, HeapObject};
use samizdat_util::ClassId;

#[repr(C)]
struct Leaf {
    header: ObjectHeader,
}

unsafe impl HeapObject for Leaf {
    fn header(&self) -> &ObjectHeader {
        &self.header
    }
}

fn alloc_leaf(heap: &Heap, class: ClassId) -> Gc<Leaf> {
    heap.alloc(Leaf { header: ObjectHeader::new(class) })
}

#[test]
fn every_live_value_is_linked_into_exactly_one_list() {
    // spec 3.1: "Every live value is linked into exactly one of two heap
    // lists: live or doomed." Immediately after allocation that list is
    // live, and the live count reflects exactly the allocated values.
    let heap = Heap::new();
    for _ in 0..5 {
        alloc_leaf(&heap, ClassId(1));
    }
    assert_eq!(heap.live_count(), 5);
}

#[test]
fn header_class_is_never_null_and_is_stable() {
    // spec 3.1: "A value's class is never null after allocation."
    // ClassId has no null representation in this encoding; we instead
    // check that the class recorded at allocation is exactly what is
    // read back, for every value, for the value's whole lifetime.
    let heap = Heap::new();
    let class = ClassId(7);
    let leaf = alloc_leaf(&heap, class);
    assert_eq!(leaf.header().class(), class);
    heap.begin_cycle();
    // unmarked: doomed, but header contents untouched until sweep frees it
    assert_eq!(leaf.header().class(), class);
}

#[test]
fn heap_validation_detects_misaligned_pointer() {
    // spec 3.1: "Heap validation detects: null, mis-alignment, ..."
    let misaligned = 1usize as *const ObjectHeader;
    assert!(ObjectHeader::validate(misaligned).is_err());
}

#[test]
fn heap_validation_detects_null_pointer() {
    let null = std::ptr::null::<ObjectHeader>();
    assert!(ObjectHeader::validate(null).is_err());
}

#[test]
fn heap_validation_accepts_freshly_allocated_value() {
    let heap = Heap::new();
    let leaf = alloc_leaf(&heap, ClassId(2));
    let header_ptr = leaf.header() as *const ObjectHeader;
    assert!(ObjectHeader::validate(header_ptr).is_ok());
}

#[test]
fn collection_ordering_guarantee_holds_across_many_cycles() {
    // spec 4.1: "A value is only freed if, at a collection point, no root
    // transitively references it." Repeated cycles with an always-rooted
    // survivor and fresh unrooted garbage each round should converge on
    // live_count == 1, never losing the survivor nor retaining garbage.
    use samizdat_gc::{gc, Roots};
    use std::ptr::NonNull;

    fn header_of(n: Gc<Leaf>) -> NonNull<ObjectHeader> {
        unsafe { NonNull::new_unchecked(n.as_ptr() as *mut ObjectHeader) }
    }

    let heap = Heap::new();
    let roots = Roots::new(16, 16);
    let survivor = alloc_leaf(&heap, ClassId(0));
    roots.immortalize(header_of(survivor)).unwrap();

    for _ in 0..20 {
        alloc_leaf(&heap, ClassId(0));
        gc::collect(&heap, &roots, |h| {
            heap.mark(h);
        });
        assert_eq!(heap.live_count(), 1);
    }
}
