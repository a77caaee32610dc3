//! `Map` — a sorted array of `(key, value)` pairs with binary-search
//! lookup (spec 3.4, 4.4.2).
//!
//! Key comparison is the universal cross-type `totalOrder` (spec 3.4),
//! which lives in [`crate::ordering`] — a layer above this module, so
//! every function here that needs to compare keys takes a comparator
//! closure rather than importing `ordering` directly, the same pattern
//! [`crate::types::list::collect`] uses for its mapping function.
//!
//! The process-wide lookup-cache acceleration (spec 4.4.2's "hashed on
//! the pair (mapPtr, keyPtr)") is not implemented here: it is pure
//! acceleration layered on top by [`crate::runtime::Runtime`], which also
//! owns the GC-mark-triggered invalidation trick (spec's `LookupCache.c`
//! singleton).

use std::cmp::Ordering;

use samizdat_gc::{Gc, Heap, HeapObject, ObjectHeader, Traceable};
use samizdat_util::ClassId;

use crate::macros::impl_heap_object;
use crate::value::Value;

type Cmp<'a> = &'a dyn Fn(Value, Value) -> Ordering;

#[repr(C)]
pub struct MapData {
    header: ObjectHeader,
    entries: Box<[(Value, Value)]>,
}

impl_heap_object!(MapData);

impl Traceable for MapData {
    fn trace(&self, marker: &mut dyn FnMut(*const ObjectHeader)) {
        for (k, v) in self.entries.iter() {
            marker(k.header() as *const ObjectHeader);
            marker(v.header() as *const ObjectHeader);
        }
    }
}

/// Builds a map from arbitrary (possibly duplicate-keyed, unsorted)
/// pairs: sorts stably by key, then collapses duplicate keys keeping the
/// *last* value written for that key in the original order (spec 4.4.2).
pub fn from_array(heap: &Heap, class: ClassId, pairs: Vec<(Value, Value)>, cmp: Cmp) -> Gc<MapData> {
    let mut indexed: Vec<(usize, (Value, Value))> = pairs.into_iter().enumerate().collect();
    indexed.sort_by(|(_, (ka, _)), (_, (kb, _))| cmp(*ka, *kb));

    let mut deduped: Vec<(usize, (Value, Value))> = Vec::with_capacity(indexed.len());
    for entry in indexed {
        match deduped.last_mut() {
            Some(last) if cmp(last.1 .0, entry.1 .0) == Ordering::Equal => {
                if entry.0 > last.0 {
                    *last = entry;
                }
            }
            _ => deduped.push(entry),
        }
    }

    let entries = deduped.into_iter().map(|(_, kv)| kv).collect::<Vec<_>>().into_boxed_slice();
    heap.alloc(MapData { header: ObjectHeader::new(class), entries })
}

pub fn size(m: Gc<MapData>) -> usize {
    m.entries.len()
}

pub fn keys(m: Gc<MapData>) -> Vec<Value> {
    m.entries.iter().map(|(k, _)| *k).collect()
}

pub fn values(m: Gc<MapData>) -> Vec<Value> {
    m.entries.iter().map(|(_, v)| *v).collect()
}

fn binary_search(m: Gc<MapData>, key: Value, cmp: Cmp) -> std::result::Result<usize, usize> {
    m.entries.binary_search_by(|(k, _)| cmp(*k, key))
}

/// `get` (spec 8): the value last written for `k`, or void (`None`) if
/// never written.
pub fn get(m: Gc<MapData>, key: Value, cmp: Cmp) -> Option<Value> {
    binary_search(m, key, cmp).ok().map(|i| m.entries[i].1)
}

pub fn put(heap: &Heap, class: ClassId, m: Gc<MapData>, key: Value, value: Value, cmp: Cmp) -> Gc<MapData> {
    let mut entries = m.entries.to_vec();
    match binary_search(m, key, cmp) {
        Ok(i) => entries[i].1 = value,
        Err(i) => entries.insert(i, (key, value)),
    }
    heap.alloc(MapData { header: ObjectHeader::new(class), entries: entries.into_boxed_slice() })
}

pub fn del(heap: &Heap, class: ClassId, m: Gc<MapData>, key: Value, cmp: Cmp) -> Gc<MapData> {
    let mut entries = m.entries.to_vec();
    if let Ok(i) = binary_search(m, key, cmp) {
        entries.remove(i);
    }
    heap.alloc(MapData { header: ObjectHeader::new(class), entries: entries.into_boxed_slice() })
}

/// `cat` (spec 4.4.2): union, with `b`'s bindings winning on key
/// conflicts (it is "written after" `a`).
pub fn cat(heap: &Heap, class: ClassId, a: Gc<MapData>, b: Gc<MapData>, cmp: Cmp) -> Gc<MapData> {
    let mut pairs = a.entries.to_vec();
    pairs.extend(b.entries.iter().copied());
    // `from_array`'s "keep the highest original index" rule naturally
    // makes `b`'s entries (appended after `a`'s) win ties.
    from_array(heap, class, pairs, cmp)
}

/// `totalOrder` (spec 3.4): `(size, key-list, value-list)` lexicographic.
pub fn total_order(a: Gc<MapData>, b: Gc<MapData>, cmp: Cmp) -> Ordering {
    match a.entries.len().cmp(&b.entries.len()) {
        Ordering::Equal => {}
        other => return other,
    }
    for ((ka, _), (kb, _)) in a.entries.iter().zip(b.entries.iter()) {
        match cmp(*ka, *kb) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    for ((_, va), (_, vb)) in a.entries.iter().zip(b.entries.iter()) {
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

    fn int_val(heap: &Heap, v: i64) -> Value {
        Value::Int(crate::types::int::alloc(heap, ClassId(0), v))
    }

    fn int_cmp(a: Value, b: Value) -> Ordering {
        a.as_int().unwrap().value.cmp(&b.as_int().unwrap().value)
    }

    #[test]
    fn get_after_put_round_trips() {
        let heap = Heap::new();
        let empty = from_array(&heap, ClassId(1), vec![], &int_cmp);
        let k = int_val(&heap, 5);
        let v = int_val(&heap, 100);
        let m = put(&heap, ClassId(1), empty, k, v, &int_cmp);
        assert_eq!(get(m, k, &int_cmp).unwrap().as_int().unwrap().value, 100);
    }

    #[test]
    fn duplicate_keys_keep_last_written() {
        let heap = Heap::new();
        let pairs = vec![
            (int_val(&heap, 1), int_val(&heap, 10)),
            (int_val(&heap, 1), int_val(&heap, 20)),
        ];
        let m = from_array(&heap, ClassId(1), pairs, &int_cmp);
        assert_eq!(size(m), 1);
        assert_eq!(get(m, int_val(&heap, 1), &int_cmp).unwrap().as_int().unwrap().value, 20);
    }

    #[test]
    fn reinsertion_in_different_order_is_equal_map() {
        let heap = Heap::new();
        let empty = from_array(&heap, ClassId(1), vec![], &int_cmp);
        let m1 = put(&heap, ClassId(1), empty, int_val(&heap, 1), int_val(&heap, 100), &int_cmp);
        let m1 = put(&heap, ClassId(1), m1, int_val(&heap, 2), int_val(&heap, 200), &int_cmp);
        let m2 = put(&heap, ClassId(1), empty, int_val(&heap, 2), int_val(&heap, 200), &int_cmp);
        let m2 = put(&heap, ClassId(1), m2, int_val(&heap, 1), int_val(&heap, 100), &int_cmp);
        assert_eq!(total_order(m1, m2, &int_cmp), Ordering::Equal);
    }

    #[test]
    fn del_removes_round_trip() {
        let heap = Heap::new();
        let empty = from_array(&heap, ClassId(1), vec![], &int_cmp);
        let k = int_val(&heap, 3);
        let m = put(&heap, ClassId(1), empty, k, int_val(&heap, 30), &int_cmp);
        let back = del(&heap, ClassId(1), m, k, &int_cmp);
        assert_eq!(total_order(back, empty, &int_cmp), Ordering::Equal);
    }
}
