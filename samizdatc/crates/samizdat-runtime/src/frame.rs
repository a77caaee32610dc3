//! `Frame` — one level of a closure's lexical environment (spec 3.5).
//!
//! A frame maps symbol to box, chains to a parent frame, and optionally
//! remembers the closure that constructed it (for diagnostics). Frames
//! are heap-allocated (not stack-allocated the way the reference's
//! per-call frame starts out) so that a closure capturing one can keep
//! it alive indefinitely without a separate "snapshot to heap" step —
//! the GC's ownership-based liveness already handles the reference's
//! distinction between a transient call frame and one retained by a
//! closure.

use std::cell::RefCell;

use samizdat_gc::{Gc, Heap, HeapObject, ObjectHeader, Traceable};
use samizdat_util::symbol::Symbol;
use samizdat_util::ClassId;

use crate::error::{Result, RuntimeError};
use crate::macros::impl_heap_object;
use crate::types::boxed::BoxData;
use crate::types::closure::ClosureData;

#[repr(C)]
pub struct FrameData {
    header: ObjectHeader,
    pub parent: Option<Gc<FrameData>>,
    pub closure: Option<Gc<ClosureData>>,
    bindings: RefCell<Vec<(Symbol, Gc<BoxData>)>>,
}

impl_heap_object!(FrameData);

impl Traceable for FrameData {
    fn trace(&self, marker: &mut dyn FnMut(*const ObjectHeader)) {
        if let Some(p) = self.parent {
            marker(p.header() as *const ObjectHeader);
        }
        if let Some(c) = self.closure {
            marker(c.header() as *const ObjectHeader);
        }
        for (_, b) in self.bindings.borrow().iter() {
            marker(b.header() as *const ObjectHeader);
        }
    }
}

pub fn new_frame(
    heap: &Heap,
    class: ClassId,
    parent: Option<Gc<FrameData>>,
    closure: Option<Gc<ClosureData>>,
) -> Gc<FrameData> {
    heap.alloc(FrameData {
        header: ObjectHeader::new(class),
        parent,
        closure,
        bindings: RefCell::new(Vec::new()),
    })
}

/// Binds `name` to `value_box` in this frame only. Shadowing an existing
/// name at the *same* frame level is fatal (spec 4.6.4); shadowing a
/// parent frame's binding is ordinary lexical scoping and always legal.
pub fn define(frame: Gc<FrameData>, name: Symbol, value_box: Gc<BoxData>) -> Result<()> {
    let mut bindings = frame.bindings.borrow_mut();
    if bindings.iter().any(|(n, _)| n.index() == name.index()) {
        return Err(RuntimeError::bad_operation("duplicate variable definition in the same frame"));
    }
    bindings.push((name, value_box));
    Ok(())
}

/// Walks `frame` and its parent chain outward for `name`'s box
/// (spec 4.6.4's "bindings are looked up by walking frames outward").
pub fn lookup(frame: Gc<FrameData>, name: Symbol) -> Option<Gc<BoxData>> {
    let mut current = Some(frame);
    while let Some(f) = current {
        if let Some((_, b)) = f.bindings.borrow().iter().find(|(n, _)| n.index() == name.index()) {
            return Some(*b);
        }
        current = f.parent;
    }
    None
}
