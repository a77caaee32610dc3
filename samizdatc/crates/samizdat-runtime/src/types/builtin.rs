//! `Builtin` — a callable backed by a native Rust function, with
//! declared arity and optional captured state (spec 3.4, 4.2, 6's
//! `makeBuiltin`).

use samizdat_gc::{Gc, Heap, HeapObject, ObjectHeader, Traceable};
use samizdat_util::ClassId;

use crate::error::EvalResult;
use crate::macros::impl_heap_object;
use crate::runtime::Runtime;
use crate::value::Value;

/// A native function implementing a builtin. Receives the live runtime
/// (for allocation/dispatch), this builtin's captured `state` (if any),
/// and the already arity-checked argument slice.
pub type NativeFn = fn(&Runtime, Option<Value>, &[Value]) -> EvalResult;

#[repr(C)]
pub struct BuiltinData {
    header: ObjectHeader,
    pub min_args: usize,
    pub max_args: Option<usize>,
    pub name: &'static str,
    pub func: NativeFn,
    state: Option<Value>,
}

impl_heap_object!(BuiltinData);

impl Traceable for BuiltinData {
    fn trace(&self, marker: &mut dyn FnMut(*const ObjectHeader)) {
        if let Some(v) = self.state {
            marker(v.header() as *const ObjectHeader);
        }
    }
}

pub fn make(
    heap: &Heap,
    class: ClassId,
    min_args: usize,
    max_args: Option<usize>,
    name: &'static str,
    func: NativeFn,
    state: Option<Value>,
) -> Gc<BuiltinData> {
    heap.alloc(BuiltinData { header: ObjectHeader::new(class), min_args, max_args, name, func, state })
}

pub fn state(b: Gc<BuiltinData>) -> Option<Value> {
    b.state
}

pub fn in_arity(b: Gc<BuiltinData>, got: usize) -> bool {
    got >= b.min_args && b.max_args.is_none_or(|m| got <= m)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_rt: &Runtime, _state: Option<Value>, _args: &[Value]) -> EvalResult {
        unreachable!("not invoked in this test")
    }

    #[test]
    fn arity_bounds_are_checked() {
        let heap = Heap::new();
        let b = make(&heap, ClassId(0), 1, Some(2), "test", noop, None);
        assert!(!in_arity(b, 0));
        assert!(in_arity(b, 1));
        assert!(in_arity(b, 2));
        assert!(!in_arity(b, 3));
    }

    #[test]
    fn unbounded_max_accepts_anything_at_or_above_min() {
        let heap = Heap::new();
        let b = make(&heap, ClassId(0), 0, None, "test", noop, None);
        assert!(in_arity(b, 1000));
    }
}
