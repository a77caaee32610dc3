//! `Record` — a `(name: symbol, payload: symbol-table)` pair (spec 3.4,
//! 4.4.4), the tagged-payload shape the executable-node translator reads
//! source nodes out of.

use std::cmp::Ordering;

use samizdat_gc::{Gc, Heap, HeapObject, ObjectHeader, Traceable};
use samizdat_util::ClassId;

use crate::macros::impl_heap_object;
use crate::types::symbol::SymbolData;
use crate::types::symbol_table::{self, SymbolTableData};
use crate::value::Value;

#[repr(C)]
pub struct RecordData {
    header: ObjectHeader,
    pub name: Gc<SymbolData>,
    pub payload: Gc<SymbolTableData>,
}

impl_heap_object!(RecordData);

impl Traceable for RecordData {
    fn trace(&self, marker: &mut dyn FnMut(*const ObjectHeader)) {
        marker(self.name.header() as *const ObjectHeader);
        marker(self.payload.header() as *const ObjectHeader);
    }
}

pub fn make(heap: &Heap, class: ClassId, name: Gc<SymbolData>, payload: Gc<SymbolTableData>) -> Gc<RecordData> {
    heap.alloc(RecordData { header: ObjectHeader::new(class), name, payload })
}

pub fn get(rec: Gc<RecordData>, key: Value) -> Option<Value> {
    symbol_table::get(rec.payload, key).ok().flatten()
}

/// `recGetN` (spec 4.4.4, supplemented from `Record.c`): destructures
/// several keys at once, returning `None` unless every key is present —
/// the interpreter's node-decoding workhorse, avoiding `N` separate
/// `get` round-trips per node.
pub fn get_many(rec: Gc<RecordData>, keys: &[Value]) -> Option<Vec<Value>> {
    let mut out = Vec::with_capacity(keys.len());
    for &key in keys {
        out.push(get(rec, key)?);
    }
    Some(out)
}

/// `totalOrder` (spec 3.4): by name, then by payload.
pub fn total_order(
    a: Gc<RecordData>,
    b: Gc<RecordData>,
    name_cmp: impl Fn(Gc<SymbolData>, Gc<SymbolData>) -> Option<Ordering>,
    value_cmp: &dyn Fn(Value, Value) -> Ordering,
) -> Option<Ordering> {
    match name_cmp(a.name, b.name) {
        Some(Ordering::Equal) => Some(symbol_table::total_order(a.payload, b.payload, value_cmp)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use samizdat_util::Interner;

    #[test]
    fn get_many_requires_all_keys_present() {
        let heap = Heap::new();
        let interner = Interner::new();
        let name = crate::types::symbol::alloc(&heap, ClassId(0), interner.intern("@call"));
        let k1 = Value::Symbol(crate::types::symbol::alloc(&heap, ClassId(0), interner.intern("target")));
        let k2 = Value::Symbol(crate::types::symbol::alloc(&heap, ClassId(0), interner.intern("values")));
        let v1 = Value::Int(crate::types::int::alloc(&heap, ClassId(0), 1));
        let payload = symbol_table::from_array(&heap, ClassId(0), vec![(k1, v1)]).unwrap();
        let rec = make(&heap, ClassId(0), name, payload);

        assert!(get_many(rec, &[k1]).is_some());
        assert!(get_many(rec, &[k1, k2]).is_none());
    }
}
