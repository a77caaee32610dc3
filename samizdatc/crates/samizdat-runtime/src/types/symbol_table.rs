//! `SymbolTable` — an immutable open-addressed hash table keyed by symbol
//! (spec 3.3, 3.4, 4.4.3).
//!
//! Keyed by `symbol.index mod arraySize` with linear probing up to a
//! small probe budget; exceeding the budget grows the table and
//! reinserts everything, exactly as spec 4.4.3 describes. Every public
//! entry point validates that keys are actually `Symbol` values and
//! returns `RuntimeError::bad_value` otherwise (spec 7's bad-value kind)
//! rather than panicking.

use std::cmp::Ordering;

use samizdat_gc::{Gc, Heap, HeapObject, ObjectHeader, Traceable};
use samizdat_util::ClassId;

use crate::error::{Result, RuntimeError};
use crate::macros::impl_heap_object;
use crate::value::Value;

const MIN_SIZE: usize = 8;
const SCALE_FACTOR: usize = 2;
const MAX_PROBE: usize = 8;

type Cmp<'a> = &'a dyn Fn(Value, Value) -> Ordering;

#[repr(C)]
pub struct SymbolTableData {
    header: ObjectHeader,
    slots: Box<[Option<(Value, Value)>]>,
    count: usize,
}

impl_heap_object!(SymbolTableData);

impl Traceable for SymbolTableData {
    fn trace(&self, marker: &mut dyn FnMut(*const ObjectHeader)) {
        for slot in self.slots.iter().flatten() {
            marker(slot.0.header() as *const ObjectHeader);
            marker(slot.1.header() as *const ObjectHeader);
        }
    }
}

fn sym_index(v: Value) -> Result<u32> {
    v.as_symbol().map(|s| s.raw.index()).ok_or_else(|| RuntimeError::bad_value("symbol table key must be a Symbol"))
}

fn capacity_for(size: usize) -> usize {
    MIN_SIZE + size * SCALE_FACTOR
}

/// Attempts to insert `(key, value)` into `slots` within the probe
/// budget. Returns `false` if the budget is exhausted (caller must
/// grow); on success, an existing binding for `key` is overwritten.
fn try_insert(slots: &mut [Option<(Value, Value)>], key: Value, value: Value, key_index: u32) -> bool {
    let cap = slots.len();
    for step in 0..MAX_PROBE.min(cap) {
        let slot = (key_index as usize + step) % cap;
        match &slots[slot] {
            None => {
                slots[slot] = Some((key, value));
                return true;
            }
            Some((k, _)) if k.as_symbol().map(|s| s.raw.index()) == Some(key_index) => {
                slots[slot] = Some((key, value));
                return true;
            }
            Some(_) => continue,
        }
    }
    false
}

fn build(mut capacity: usize, pairs: &[(Value, Value)]) -> Result<Box<[Option<(Value, Value)>]>> {
    loop {
        let mut slots: Vec<Option<(Value, Value)>> = vec![None; capacity.max(1)];
        let mut ok = true;
        for &(k, v) in pairs {
            let idx = sym_index(k)?;
            if !try_insert(&mut slots, k, v, idx) {
                ok = false;
                break;
            }
        }
        if ok {
            return Ok(slots.into_boxed_slice());
        }
        capacity = capacity.max(1) * SCALE_FACTOR;
    }
}

/// Builds a table from arbitrary pairs, last occurrence of a duplicate
/// key wins (consistent with `Map`'s construction rule, spec 4.4.2).
pub fn from_array(heap: &Heap, class: ClassId, pairs: Vec<(Value, Value)>) -> Result<Gc<SymbolTableData>> {
    let cap = capacity_for(pairs.len());
    let slots = build(cap, &pairs)?;
    let count = slots.iter().flatten().count();
    Ok(heap.alloc(SymbolTableData { header: ObjectHeader::new(class), slots, count }))
}

pub fn size(t: Gc<SymbolTableData>) -> usize {
    t.count
}

pub fn get(t: Gc<SymbolTableData>, key: Value) -> Result<Option<Value>> {
    let idx = sym_index(key)?;
    let cap = t.slots.len();
    if cap == 0 {
        return Ok(None);
    }
    for step in 0..MAX_PROBE.min(cap) {
        let slot = (idx as usize + step) % cap;
        match &t.slots[slot] {
            Some((k, v)) if k.as_symbol().map(|s| s.raw.index()) == Some(idx) => return Ok(Some(*v)),
            None => return Ok(None),
            _ => continue,
        }
    }
    Ok(None)
}

pub fn put(heap: &Heap, class: ClassId, t: Gc<SymbolTableData>, key: Value, value: Value) -> Result<Gc<SymbolTableData>> {
    let mut pairs: Vec<(Value, Value)> = t.slots.iter().flatten().copied().collect();
    pairs.push((key, value));
    from_array(heap, class, pairs)
}

pub fn del(heap: &Heap, class: ClassId, t: Gc<SymbolTableData>, key: Value) -> Result<Gc<SymbolTableData>> {
    let idx = sym_index(key)?;
    let pairs: Vec<(Value, Value)> = t
        .slots
        .iter()
        .flatten()
        .filter(|(k, _)| k.as_symbol().map(|s| s.raw.index()) != Some(idx))
        .copied()
        .collect();
    from_array(heap, class, pairs)
}

fn sorted_pairs(t: Gc<SymbolTableData>) -> Vec<(Value, Value)> {
    let mut pairs: Vec<(Value, Value)> = t.slots.iter().flatten().copied().collect();
    pairs.sort_by_key(|(k, _)| k.as_symbol().map(|s| s.raw.index()).unwrap_or(u32::MAX));
    pairs
}

/// Order-independent content equality (spec 8): same set of bindings.
pub fn total_eq(a: Gc<SymbolTableData>, b: Gc<SymbolTableData>, value_eq: impl Fn(Value, Value) -> bool) -> bool {
    if a.count != b.count {
        return false;
    }
    for (k, v) in a.slots.iter().flatten() {
        match get(b, *k) {
            Ok(Some(bv)) if value_eq(*v, bv) => continue,
            _ => return false,
        }
    }
    true
}

/// `totalOrder` (spec 3.4): size, then sorted key-list, then
/// corresponding values in that key order.
pub fn total_order(a: Gc<SymbolTableData>, b: Gc<SymbolTableData>, cmp: Cmp) -> Ordering {
    match a.count.cmp(&b.count) {
        Ordering::Equal => {}
        other => return other,
    }
    let (pa, pb) = (sorted_pairs(a), sorted_pairs(b));
    for ((ka, _), (kb, _)) in pa.iter().zip(pb.iter()) {
        match cmp(*ka, *kb) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    for ((_, va), (_, vb)) in pa.iter().zip(pb.iter()) {
        match cmp(*va, *vb) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use samizdat_util::Interner;

    fn sym_val(heap: &Heap, interner: &Interner, name: &str) -> Value {
        Value::Symbol(crate::types::symbol::alloc(heap, ClassId(0), interner.intern(name)))
    }

    fn int_val(heap: &Heap, v: i64) -> Value {
        Value::Int(crate::types::int::alloc(heap, ClassId(0), v))
    }

    #[test]
    fn get_after_put_round_trips() {
        let heap = Heap::new();
        let interner = Interner::new();
        let empty = from_array(&heap, ClassId(1), vec![]).unwrap();
        let k = sym_val(&heap, &interner, "x");
        let v = int_val(&heap, 42);
        let t = put(&heap, ClassId(1), empty, k, v).unwrap();
        assert_eq!(get(t, k).unwrap().unwrap().as_int().unwrap().value, 42);
    }

    #[test]
    fn grows_past_probe_budget() {
        let heap = Heap::new();
        let interner = Interner::new();
        let mut t = from_array(&heap, ClassId(1), vec![]).unwrap();
        for i in 0..40 {
            let k = sym_val(&heap, &interner, &format!("k{i}"));
            t = put(&heap, ClassId(1), t, k, int_val(&heap, i)).unwrap();
        }
        assert_eq!(size(t), 40);
    }

    #[test]
    fn non_symbol_key_is_bad_value() {
        let heap = Heap::new();
        let empty = from_array(&heap, ClassId(1), vec![]).unwrap();
        assert!(get(empty, int_val(&heap, 1)).is_err());
    }

    #[test]
    fn equality_is_order_independent() {
        let heap = Heap::new();
        let interner = Interner::new();
        let a = sym_val(&heap, &interner, "a");
        let b = sym_val(&heap, &interner, "b");
        let t1 = from_array(&heap, ClassId(1), vec![(a, int_val(&heap, 1)), (b, int_val(&heap, 2))]).unwrap();
        let t2 = from_array(&heap, ClassId(1), vec![(b, int_val(&heap, 2)), (a, int_val(&heap, 1))]).unwrap();
        let int_eq = |x: Value, y: Value| x.as_int().unwrap().value == y.as_int().unwrap().value;
        assert!(total_eq(t1, t2, int_eq));
    }
}
