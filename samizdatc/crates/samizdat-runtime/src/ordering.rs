//! Universal `totalEq`/`totalOrder`/`debugString` spanning every `Value`
//! variant (spec 3.4, 8): "equality and ordering are total on values of
//! the same class; cross-class ordering is by class order."
//!
//! Every concrete type module (`types::list`, `types::map`, ...) already
//! implements its own structural comparison but takes a comparator
//! closure for any nested `Value` it needs to compare — this module is
//! the thing that actually supplies that closure, tying every per-type
//! function together into one recursive whole.

use std::cmp::Ordering;
use std::ptr::NonNull;

use samizdat_gc::{Gc, HeapObject};

use crate::runtime::Runtime;
use crate::types::{class, list, map, record, string, symbol_table, uniqlet};
use crate::value::Value;

fn identity_order<T>(a: Gc<T>, b: Gc<T>) -> Ordering {
    (a.as_ptr() as usize).cmp(&(b.as_ptr() as usize))
}

/// `totalOrder` (spec 3.4, 8). `None` only arises from the Symbol class's
/// documented exception: two distinct anonymous symbols sharing a name
/// are unordered with respect to each other.
pub fn total_order(rt: &Runtime, a: Value, b: Value) -> Option<Ordering> {
    if a.class_id() != b.class_id() {
        let ca = rt.class_of(a.class_id());
        let cb = rt.class_of(b.class_id());
        return class::total_order(ca, cb, |x, y| symbol_name_order(rt, x, y));
    }

    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.value.cmp(&y.value)),
        (Value::Str(x), Value::Str(y)) => Some(string::total_order(x, y)),
        (Value::Symbol(x), Value::Symbol(y)) => x.raw.total_order(y.raw, rt.interner()),
        (Value::List(x), Value::List(y)) => list::total_order(x, y, |p, q| total_order(rt, p, q)),
        (Value::Map(x), Value::Map(y)) => {
            Some(map::total_order(x, y, &|p, q| total_order(rt, p, q).unwrap_or(Ordering::Equal)))
        }
        (Value::SymbolTable(x), Value::SymbolTable(y)) => Some(symbol_table::total_order(x, y, &|p, q| {
            total_order(rt, p, q).unwrap_or(Ordering::Equal)
        })),
        (Value::Record(x), Value::Record(y)) => record::total_order(
            x,
            y,
            |n1, n2| symbol_name_order(rt, n1, n2),
            &|p, q| total_order(rt, p, q).unwrap_or(Ordering::Equal),
        ),
        (Value::Uniqlet(x), Value::Uniqlet(y)) => Some(uniqlet::identity_order(x, y)),
        (Value::Boxed(x), Value::Boxed(y)) => Some(identity_order(x, y)),
        (Value::Class(x), Value::Class(y)) => class::total_order(x, y, |n1, n2| symbol_name_order(rt, n1, n2)),
        (Value::Closure(x), Value::Closure(y)) => Some(identity_order(x, y)),
        (Value::Builtin(x), Value::Builtin(y)) => Some(identity_order(x, y)),
        (Value::Jump(x), Value::Jump(y)) => Some(identity_order(x, y)),
        _ => unreachable!("equal class ids must share a Value variant"),
    }
}

fn symbol_name_order(
    rt: &Runtime,
    a: Gc<crate::types::symbol::SymbolData>,
    b: Gc<crate::types::symbol::SymbolData>,
) -> Option<Ordering> {
    a.raw.total_order(b.raw, rt.interner())
}

pub fn total_eq(rt: &Runtime, a: Value, b: Value) -> bool {
    total_order(rt, a, b) == Some(Ordering::Equal)
}

/// A debugging rendering good enough for diagnostics, not a stable
/// serialization format (spec 7's fatal-error diagnostics reuse this to
/// print operand values).
pub fn debug_string(rt: &Runtime, v: Value) -> String {
    match v {
        Value::Int(x) => x.value.to_string(),
        Value::Str(x) => format!("{:?}", string::utf8_of(x)),
        Value::Symbol(x) => crate::types::symbol::name(rt.interner(), x).to_string(),
        Value::List(x) => {
            let items: Vec<String> = list::array_of(x).into_iter().map(|v| debug_string(rt, v)).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Map(x) => {
            let pairs: Vec<String> = map::keys(x)
                .into_iter()
                .zip(map::values(x))
                .map(|(k, v)| format!("{}: {}", debug_string(rt, k), debug_string(rt, v)))
                .collect();
            format!("{{{}}}", pairs.join(", "))
        }
        Value::SymbolTable(_) => "#<SymbolTable>".to_string(),
        Value::Record(x) => format!("{}{{...}}", crate::types::symbol::name(rt.interner(), x.name)),
        Value::Uniqlet(x) => format!("#<Uniqlet@{:x}>", x.as_ptr() as usize),
        Value::Boxed(x) => format!("#<Box@{:x}>", x.as_ptr() as usize),
        Value::Class(x) => format!("#<Class {}>", crate::types::symbol::name(rt.interner(), x.name)),
        Value::Closure(x) => format!("#<Closure@{:x}>", x.as_ptr() as usize),
        Value::Builtin(x) => format!("#<Builtin {}>", x.name),
        Value::Jump(x) => format!("#<Jump@{:x}>", x.as_ptr() as usize),
    }
}

pub(crate) fn header_ptr(v: Value) -> NonNull<samizdat_gc::ObjectHeader> {
    unsafe { NonNull::new_unchecked(v.header() as *const _ as *mut _) }
}
