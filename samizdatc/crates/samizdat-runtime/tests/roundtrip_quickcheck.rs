//! Property-based tests for the universal round-trip and ordering laws
//! spec section 8 asks of every built-in collection type, run against
//! randomized inputs rather than the fixed scenarios `interp.rs`'s
//! `#[cfg(test)]` module covers.

use quickcheck_macros::quickcheck;
use samizdat_runtime::ordering;
use samizdat_runtime::runtime::Runtime;
use samizdat_runtime::types::{int, list, map, string};
use samizdat_runtime::value::Value;
use std::cmp::Ordering as StdOrdering;

/// `stringFromUtf8(utf8Of(s)) == s` for any sequence of chars.
#[quickcheck]
fn string_utf8_round_trips(chars: Vec<char>) -> bool {
    let rt = Runtime::new();
    let s = string::alloc(rt.heap(), rt.classes().string, chars.clone());
    let back = string::from_utf8(rt.heap(), rt.classes().string, &string::utf8_of(s));
    string::chars(back) == chars
}

/// `listFromArray(arrayOfList(l)) == l` for any array of integers.
#[quickcheck]
fn list_array_round_trips(values: Vec<i64>) -> bool {
    let rt = Runtime::new();
    let items: Vec<Value> = values.iter().map(|&n| Value::Int(int::alloc(rt.heap(), rt.classes().int, n))).collect();
    let l = list::from_array(rt.heap(), rt.classes().list, items);
    let back = list::from_array(rt.heap(), rt.classes().list, list::array_of(l));
    let expect: Vec<i64> = list::array_of(back)
        .into_iter()
        .map(|v| match v {
            Value::Int(n) => n.value,
            _ => unreachable!(),
        })
        .collect();
    expect == values
}

fn int_cmp(a: Value, b: Value) -> StdOrdering {
    let (Value::Int(a), Value::Int(b)) = (a, b) else { unreachable!() };
    a.value.cmp(&b.value)
}

/// `put(m, k, get(m, k))` is a no-op when `k` is already bound: the
/// resulting map has the same size and still maps `k` to the same value.
#[quickcheck]
fn put_of_its_own_value_is_a_no_op(pairs: Vec<(i64, i64)>, pick: usize) -> bool {
    if pairs.is_empty() {
        return true;
    }
    let rt = Runtime::new();
    let heap = rt.heap();
    let class = rt.classes().map;
    let raw: Vec<(Value, Value)> = pairs
        .iter()
        .map(|&(k, v)| (Value::Int(int::alloc(heap, rt.classes().int, k)), Value::Int(int::alloc(heap, rt.classes().int, v))))
        .collect();
    let m = map::from_array(heap, class, raw, &int_cmp);

    let key = map::keys(m)[pick % map::keys(m).len()];
    let before_size = map::size(m);
    let current = map::get(m, key, &int_cmp).unwrap();
    let after = map::put(heap, class, m, key, current, &int_cmp);

    let still_there = map::get(after, key, &int_cmp).is_some_and(|v| v.is_same(&current));
    map::size(after) == before_size && still_there
}

/// `totalOrder` is transitive over any three integers: `a <= b` and
/// `b <= c` implies `a <= c`.
#[quickcheck]
fn total_order_is_transitive(a: i64, b: i64, c: i64) -> bool {
    let rt = Runtime::new();
    let heap = rt.heap();
    let class = rt.classes().int;
    let va = Value::Int(int::alloc(heap, class, a));
    let vb = Value::Int(int::alloc(heap, class, b));
    let vc = Value::Int(int::alloc(heap, class, c));

    let ab = ordering::total_order(&rt, va, vb);
    let bc = ordering::total_order(&rt, vb, vc);
    let ac = ordering::total_order(&rt, va, vc);

    let le = |o: Option<StdOrdering>| matches!(o, Some(StdOrdering::Less) | Some(StdOrdering::Equal));
    !(le(ab) && le(bc)) || le(ac)
}
