//! Single-threaded symbol interner.
//!
//! Grounded on the reference `Symbol.c`: interned and anonymous symbols
//! share one monotonic index counter (so the index space stays dense and
//! usable as a method-table slot), but only interned symbols are
//! findable-by-name. The by-name lookup is accelerated by a binary-search
//! array that is kept sorted lazily — rebuilt on the next `intern` miss
//! after having been read, rather than resorted on every single insert.

use std::cell::RefCell;

use super::Symbol;

/// Per-process symbol table. Not `Sync`/`Send`: the runtime this utility
/// backs is explicitly single-threaded (no concurrency Non-goal), so a
/// `RefCell` replaces the concurrent-reader map a multi-threaded host would
/// need.
pub struct Interner {
    inner: RefCell<Inner>,
}

struct Inner {
    /// `names[index]` is the leaked, `'static` backing string for the
    /// symbol with that index. Shared by interned and anonymous symbols.
    names: Vec<&'static str>,
    /// Indices of interned (name-deduplicated) symbols, in insertion
    /// order. Source of truth for name lookup before the sorted cache is
    /// rebuilt.
    interned_by_name: ahash::AHashMap<&'static str, u32>,
    /// Sorted `(name, index)` pairs for interned symbols, rebuilt lazily
    /// by [`Inner::ensure_sorted`]. `None` when stale.
    sorted: Option<Vec<(&'static str, u32)>>,
}

impl Interner {
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(Inner {
                names: Vec::new(),
                interned_by_name: ahash::AHashMap::new(),
                sorted: Some(Vec::new()),
            }),
        }
    }

    /// Interns `name`, returning the existing symbol if already interned.
    pub fn intern(&self, name: &str) -> Symbol {
        let mut inner = self.inner.borrow_mut();

        if let Some(&index) = inner.interned_by_name.get(name) {
            return Symbol { index, interned: true };
        }

        let leaked: &'static str = Box::leak(name.to_string().into_boxed_str());
        let index = inner.names.len() as u32;
        inner.names.push(leaked);
        inner.interned_by_name.insert(leaked, index);
        inner.sorted = None;

        Symbol { index, interned: true }
    }

    /// Allocates a fresh, never-deduplicated symbol. Two anonymous symbols
    /// created with the same `name` are distinct and unordered with
    /// respect to one another (see [`Symbol::total_order`]).
    pub fn make_anonymous(&self, name: &str) -> Symbol {
        let mut inner = self.inner.borrow_mut();

        let leaked: &'static str = Box::leak(name.to_string().into_boxed_str());
        let index = inner.names.len() as u32;
        inner.names.push(leaked);

        Symbol { index, interned: false }
    }

    /// Looks up an already-interned symbol by name without creating one.
    pub fn find(&self, name: &str) -> Option<Symbol> {
        let inner = self.inner.borrow();
        inner
            .interned_by_name
            .get(name)
            .map(|&index| Symbol { index, interned: true })
    }

    /// Returns the backing name for any symbol (interned or anonymous).
    pub fn name(&self, symbol: Symbol) -> &'static str {
        self.inner.borrow().names[symbol.index as usize]
    }

    /// Number of symbols ever allocated (interned + anonymous).
    pub fn len(&self) -> usize {
        self.inner.borrow().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rebuilds (if stale) and returns a snapshot of the sorted
    /// `(name, index)` table used for binary-search lookup of interned
    /// symbols, mirroring the reference's "sort on demand" array.
    pub fn sorted_interned(&self) -> Vec<(&'static str, u32)> {
        let mut inner = self.inner.borrow_mut();
        if inner.sorted.is_none() {
            let mut v: Vec<(&'static str, u32)> = inner
                .interned_by_name
                .iter()
                .map(|(&name, &index)| (name, index))
                .collect();
            v.sort_unstable_by_key(|&(name, _)| name);
            inner.sorted = Some(v);
        }
        inner.sorted.clone().unwrap()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}
