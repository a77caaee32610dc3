//! `Closure` — a callable value carrying a captured frame and a
//! translated body (spec 3.4, 3.5, 4.6).
//!
//! The translated body (`ClosureTemplate`) is immutable, shared code —
//! produced once by [`crate::interp::translate`] — not a `Value` in its
//! own right, so it is held behind a plain `Rc` rather than a `Gc`: it
//! owns no reference to anything GC-traces, and nothing in user code can
//! observe it directly.

use std::cell::Cell;
use std::rc::Rc;

use samizdat_gc::{Gc, Heap, HeapObject, ObjectHeader, Traceable};
use samizdat_util::symbol::Symbol;
use samizdat_util::ClassId;

use crate::formals::Formal;
use crate::frame::FrameData;
use crate::interp::ExecNode;
use crate::macros::impl_heap_object;

pub struct ClosureTemplate {
    pub formals: Vec<Formal>,
    pub statements: Vec<ExecNode>,
    pub yield_expr: Option<ExecNode>,
    /// The name bound to the nonlocal-exit `Jump`, if this closure
    /// declares one (spec 4.6.3 step 3).
    pub yield_def: Option<Symbol>,
    pub debug_name: Option<String>,
}

#[repr(C)]
pub struct ClosureData {
    header: ObjectHeader,
    /// `Cell`, not a plain field: the two-pass mutual-recursion
    /// construction (spec 4.6's supplemented `execFnDefs`) re-snapshots
    /// this after every sibling `fnDef` in a batch has bound its name,
    /// so each closure's captured frame sees all of its siblings.
    frame: Cell<Option<Gc<FrameData>>>,
    pub template: Rc<ClosureTemplate>,
}

impl_heap_object!(ClosureData);

impl Traceable for ClosureData {
    fn trace(&self, marker: &mut dyn FnMut(*const ObjectHeader)) {
        if let Some(f) = self.frame.get() {
            marker(f.header() as *const ObjectHeader);
        }
    }
}

pub fn make(heap: &Heap, class: ClassId, frame: Option<Gc<FrameData>>, template: Rc<ClosureTemplate>) -> Gc<ClosureData> {
    heap.alloc(ClosureData { header: ObjectHeader::new(class), frame: Cell::new(frame), template })
}

pub fn captured_frame(c: Gc<ClosureData>) -> Option<Gc<FrameData>> {
    c.frame.get()
}

/// Re-snapshots the captured frame pointer (used only by the two-pass
/// `fnDef` construction, after every sibling name has been bound into
/// the shared frame).
pub fn recapture(c: Gc<ClosureData>, frame: Gc<FrameData>) {
    c.frame.set(Some(frame));
}
