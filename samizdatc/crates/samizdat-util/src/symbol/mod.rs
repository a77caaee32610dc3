//! Symbol interning — compact handles for names used throughout the runtime.
//!
//! This module provides [`Symbol`], a 4-byte handle to an interned name.
//! Symbols give O(1) equality and are suitable as array indices (each
//! interned name is assigned a dense small-integer index on first use).
//!
//! # Overview
//!
//! - **Memory efficiency**: each unique name is stored once.
//! - **Fast comparison**: symbol equality is index comparison.
//! - **Dense indices**: the assigned index is usable directly as an array
//!   slot (e.g. a class's method table, keyed by selector index).
//!
//! # Interned vs. anonymous
//!
//! Two kinds of symbol share one index space. *Interned* symbols are
//! deduplicated by name: interning the same string twice returns the same
//! [`Symbol`]. *Anonymous* symbols are never deduplicated — each call to
//! [`Interner::make_anonymous`] allocates a fresh index even if the name
//! matches an existing symbol, interned or anonymous. Two distinct
//! anonymous symbols that happen to share a name are intentionally
//! *unordered* with respect to each other (see [`Symbol::total_order`]).
//!
//! # Examples
//!
//! ```
//! use samizdat_util::symbol::Interner;
//!
//! let interner = Interner::new();
//! let a = interner.intern("foo");
//! let b = interner.intern("foo");
//! let c = interner.intern("bar");
//!
//! assert_eq!(a, b);
//! assert_ne!(a, c);
//! assert_eq!(interner.name(a), "foo");
//! ```

pub mod interner;

pub use interner::Interner;

use std::cmp::Ordering;

/// A compact handle to an interned or anonymous name.
///
/// Equality and `Hash` are by index only — two symbols are equal iff they
/// were produced by the same `intern`/`make_anonymous` call (or by two
/// `intern` calls for the same name).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Symbol {
    pub(crate) index: u32,
    pub(crate) interned: bool,
}

impl Symbol {
    /// The dense small-integer index assigned to this symbol. Stable for
    /// the process lifetime; usable directly as a method-table slot.
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Whether this symbol is name-deduplicated (as opposed to anonymous).
    #[inline]
    pub fn is_interned(self) -> bool {
        self.interned
    }

    /// Total order used by the built-in `Symbol` class's `totalOrder`
    /// method: interned symbols sort before anonymous ones; among symbols
    /// of the same kind, by name; among two *anonymous* symbols with equal
    /// names, the order is undefined and this returns `None` (mirroring
    /// the reference implementation's `void` result for that case).
    pub fn total_order(self, other: Self, interner: &Interner) -> Option<Ordering> {
        match (self.interned, other.interned) {
            (true, false) => return Some(Ordering::Less),
            (false, true) => return Some(Ordering::Greater),
            _ => {}
        }

        let a = interner.name(self);
        let b = interner.name(other);
        match a.cmp(b) {
            Ordering::Equal if !self.interned => {
                if self.index == other.index {
                    Some(Ordering::Equal)
                } else {
                    None
                }
            }
            ord => Some(ord),
        }
    }
}
