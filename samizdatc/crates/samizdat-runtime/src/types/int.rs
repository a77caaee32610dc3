//! `Int` — 64-bit signed integers (spec 3.4, 4.4.6).
//!
//! Carries no owned references, so [`IntData::trace`] is a no-op; the
//! runtime still caches small integers as process-wide singletons (spec
//! 3.4's "integers in a small range are cached") via
//! [`crate::runtime::Runtime::small_int_cache`], which this module doesn't
//! know about directly — it only provides the raw allocation and
//! arithmetic primitives the cache and the embedding API build on.

use samizdat_gc::{Heap, HeapObject, ObjectHeader, Traceable};
use samizdat_util::ClassId;

use crate::error::{Result, RuntimeError};
use crate::macros::impl_heap_object;

#[repr(C)]
pub struct IntData {
    header: ObjectHeader,
    pub value: i64,
}

impl_heap_object!(IntData);

impl Traceable for IntData {
    fn trace(&self, _marker: &mut dyn FnMut(*const ObjectHeader)) {}
}

/// Smallest/largest cached singleton value (inclusive), mirroring the
/// reference's small-int cache range.
pub const SMALL_INT_MIN: i64 = -256;
pub const SMALL_INT_MAX: i64 = 255;

pub fn alloc(heap: &Heap, class: ClassId, value: i64) -> samizdat_gc::Gc<IntData> {
    heap.alloc(IntData { header: ObjectHeader::new(class), value })
}

pub fn checked_add(a: i64, b: i64) -> Result<i64> {
    a.checked_add(b).ok_or_else(|| RuntimeError::bad_operation("integer overflow in addition"))
}

pub fn checked_sub(a: i64, b: i64) -> Result<i64> {
    a.checked_sub(b).ok_or_else(|| RuntimeError::bad_operation("integer overflow in subtraction"))
}

pub fn checked_mul(a: i64, b: i64) -> Result<i64> {
    a.checked_mul(b).ok_or_else(|| RuntimeError::bad_operation("integer overflow in multiplication"))
}

pub fn checked_neg(a: i64) -> Result<i64> {
    a.checked_neg().ok_or_else(|| RuntimeError::bad_operation("integer overflow in negation"))
}

pub fn abs(a: i64) -> Result<i64> {
    a.checked_abs().ok_or_else(|| RuntimeError::bad_operation("integer overflow in abs"))
}

pub fn sign(a: i64) -> i64 {
    a.signum()
}

/// Euclidean division: the remainder is always non-negative (spec 4.4.6's
/// "eu-mod/div").
pub fn eu_div(a: i64, b: i64) -> Result<i64> {
    if b == 0 {
        return Err(RuntimeError::bad_operation("division by zero"));
    }
    Ok(a.div_euclid(b))
}

pub fn eu_mod(a: i64, b: i64) -> Result<i64> {
    if b == 0 {
        return Err(RuntimeError::bad_operation("modulo by zero"));
    }
    Ok(a.rem_euclid(b))
}

pub fn bit_and(a: i64, b: i64) -> i64 {
    a & b
}

pub fn bit_or(a: i64, b: i64) -> i64 {
    a | b
}

pub fn bit_xor(a: i64, b: i64) -> i64 {
    a ^ b
}

pub fn bit_not(a: i64) -> i64 {
    !a
}

/// Left/right shift by `bits`, Euclidean-normalized: a negative `bits`
/// shifts the other way. Shifting by 64 or more in either direction
/// always yields an all-zero or all-sign result, matching `i64`'s own
/// saturating behavior rather than panicking like the unchecked `<<`/`>>`
/// operators would on an out-of-range count.
pub fn shift_left(a: i64, bits: i64) -> i64 {
    if bits < 0 {
        shift_right(a, -bits)
    } else if bits >= 64 {
        0
    } else {
        a.wrapping_shl(bits as u32)
    }
}

pub fn shift_right(a: i64, bits: i64) -> i64 {
    if bits < 0 {
        shift_left(a, -bits)
    } else if bits >= 64 {
        if a < 0 { -1 } else { 0 }
    } else {
        a.wrapping_shr(bits as u32)
    }
}

/// A single code point, for `Int`/single-character-`String` conversion
/// (spec 4.4.6).
pub fn to_code_point(a: i64) -> Result<char> {
    u32::try_from(a)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| RuntimeError::bad_operation(format!("{a} is not a valid code point")))
}

pub fn from_code_point(c: char) -> i64 {
    c as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_roundtrips_value() {
        let heap = Heap::new();
        let n = alloc(&heap, ClassId(1), 42);
        assert_eq!(n.value, 42);
    }

    #[test]
    fn add_overflow_is_an_error() {
        assert!(checked_add(i64::MAX, 1).is_err());
        assert_eq!(checked_add(2, 3).unwrap(), 5);
    }

    #[test]
    fn eu_mod_is_always_non_negative() {
        assert_eq!(eu_mod(-7, 3).unwrap(), 2);
        assert_eq!(eu_div(-7, 3).unwrap(), -3);
    }

    #[test]
    fn code_point_round_trip() {
        let c = to_code_point(65).unwrap();
        assert_eq!(c, 'A');
        assert_eq!(from_code_point('A'), 65);
    }

    #[test]
    fn division_by_zero_is_bad_operation() {
        assert!(eu_div(1, 0).is_err());
        assert!(eu_mod(1, 0).is_err());
    }

    #[test]
    fn bitwise_ops_match_builtin_operators() {
        assert_eq!(bit_and(0b1100, 0b1010), 0b1000);
        assert_eq!(bit_or(0b1100, 0b1010), 0b1110);
        assert_eq!(bit_xor(0b1100, 0b1010), 0b0110);
        assert_eq!(bit_not(0), -1);
    }

    #[test]
    fn shifts_handle_negative_counts_and_overflow_width() {
        assert_eq!(shift_left(1, 4), 16);
        assert_eq!(shift_left(1, -4), shift_right(1, 4));
        assert_eq!(shift_right(-1, 100), -1);
        assert_eq!(shift_left(1, 100), 0);
    }
}
