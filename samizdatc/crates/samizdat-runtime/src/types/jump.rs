//! `Jump` — a nonlocal-exit value (spec 3.4, 4.7, GLOSSARY).
//!
//! The reference arms a jump with `sigsetjmp` and unwinds to it with
//! `siglongjmp`. This is rendered in idiomatic Rust as ordinary control
//! flow instead: arming allocates a `JumpData` with a fresh id and
//! `valid = true`; "calling" it produces `Err(Flow::Jump(JumpUnwind))`
//! carrying that id, which propagates via `?` exactly like any other
//! early return until [`crate::interp`]'s call-frame logic recognizes a
//! matching id and converts it back into a normal return value — see
//! `src/error.rs`'s doc comment and DESIGN.md's Open Question
//! resolution for why no real `setjmp`/`longjmp` FFI is used.

use std::cell::Cell;

use samizdat_gc::{Gc, Heap, HeapObject, ObjectHeader, Traceable};
use samizdat_util::ClassId;

use crate::error::{EvalResult, Flow, JumpUnwind, RuntimeError};
use crate::macros::impl_heap_object;
use crate::value::Value;

#[repr(C)]
pub struct JumpData {
    header: ObjectHeader,
    pub id: u64,
    valid: Cell<bool>,
}

impl_heap_object!(JumpData);

impl Traceable for JumpData {
    fn trace(&self, _marker: &mut dyn FnMut(*const ObjectHeader)) {}
}

pub fn arm(heap: &Heap, class: ClassId, id: u64) -> Gc<JumpData> {
    heap.alloc(JumpData { header: ObjectHeader::new(class), id, valid: Cell::new(true) })
}

/// Retires the jump once its arming call returns normally (spec 4.7:
/// "validity is scoped to the dynamic extent of the closure call that
/// armed it").
pub fn retire(j: Gc<JumpData>) {
    j.valid.set(false);
}

pub fn is_valid(j: Gc<JumpData>) -> bool {
    j.valid.get()
}

/// Calling a jump (spec 4.7): fatal if retired/out-of-scope; zero args
/// yields void; one arg carries that value; two or more is fatal.
pub fn call(j: Gc<JumpData>, args: &[Value]) -> EvalResult {
    if !j.valid.get() {
        return Err(Flow::Error(RuntimeError::bad_operation("jump called out of scope")));
    }
    match args.len() {
        0 => Err(Flow::Jump(JumpUnwind { jump_id: j.id, value: None })),
        1 => Err(Flow::Jump(JumpUnwind { jump_id: j.id, value: Some(args[0]) })),
        _ => Err(Flow::Error(RuntimeError::bad_operation("jump called with more than one argument"))),
    }
}
