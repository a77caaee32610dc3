//! The live/doomed value lists (spec 3.1, 4.1).
//!
//! `Heap` owns the two intrusive doubly-linked lists every value belongs
//! to (exactly one, per the value-header invariant) and is the only
//! place that allocates, links, unlinks, or frees a value. It has no
//! notion of *why* a value is reachable — that is the collector's and
//! the runtime's job (walking roots and calling [`Heap::mark`]).

use crate::error::{GcError, Result};
use crate::logging;
use crate::object::{Gc, HeapObject, ObjectHeader};
use std::cell::Cell;
use std::ptr::NonNull;
/// Which of the two lists a header currently belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListId {
    Live,
    Doomed,
}

pub struct Heap {
    live_head: Cell<Option<NonNull<ObjectHeader>>>,
    doomed_head: Cell<Option<NonNull<ObjectHeader>>>,
    live_count: Cell<usize>,
    doomed_count: Cell<usize>,
    /// Allocations since the last collection; compared against
    /// `GcConfig::alloc_trip_threshold` by the owning runtime to decide
    /// when to call back into [`crate::gc`].
    alloc_count: Cell<usize>,
}

impl Heap {
    pub fn new() -> Self {
        Self {
            live_head: Cell::new(None),
            doomed_head: Cell::new(None),
            live_count: Cell::new(0),
            doomed_count: Cell::new(0),
            alloc_count: Cell::new(0),
        }
    }

    /// Allocates `value` of concrete type `T`, links it into the live
    /// list, and returns a typed pointer to it. Every built-in value
    /// constructor in `samizdat-runtime` bottoms out here (spec 4.1's
    /// `allocValue`).
    pub fn alloc<T: HeapObject>(&self, value: T) -> Gc<T> {
        let raw: *mut T = Box::into_raw(Box::new(value));
        // SAFETY: T is HeapObject, so its header is the first field
        // (repr(C) contract upheld by every implementor).
        let header_ptr = unsafe { NonNull::new_unchecked(raw as *mut ObjectHeader) };
        unsafe {
            header_ptr.as_ref().set_drop_fn(drop_glue::<T>);
        }
        self.link_front(ListId::Live, header_ptr);
        self.alloc_count.set(self.alloc_count.get() + 1);
        unsafe { Gc::from_raw(NonNull::new_unchecked(raw)) }
    }

    pub fn alloc_count(&self) -> usize {
        self.alloc_count.get()
    }

    pub fn reset_alloc_count(&self) {
        self.alloc_count.set(0);
    }

    pub fn live_count(&self) -> usize {
        self.live_count.get()
    }

    /// Step 1 of collection (spec 4.1): splice live into doomed, live
    /// becomes empty. Every value must earn its way back to live by
    /// being marked.
    pub fn begin_cycle(&self) {
        if let Some(doomed_head) = self.doomed_head.get() {
            if let Some(live_head) = self.live_head.get() {
                // Splice: append the old doomed list after live, i.e. the
                // combined list is live-then-doomed; simplest correct
                // approach since we immediately treat the whole thing as
                // "doomed" for this cycle.
                let live_tail = Self::tail_of(live_head);
                unsafe {
                    live_tail.as_ref().set_next(Some(doomed_head));
                    doomed_head.as_ref().set_prev(Some(live_tail));
                }
                self.doomed_head.set(Some(live_head));
            } else {
                self.doomed_head.set(Some(doomed_head));
            }
        } else {
            self.doomed_head.set(self.live_head.get());
        }
        self.doomed_count.set(self.doomed_count.get() + self.live_count.get());
        self.live_head.set(None);
        self.live_count.set(0);
    }

    /// Step 2 (spec 4.1): marks `header_ptr` live. Returns `true` if it
    /// was already marked (caller should not re-trace its members).
    /// Moves the value from doomed back to live.
    pub fn mark(&self, header_ptr: NonNull<ObjectHeader>) -> bool {
        let header = unsafe { header_ptr.as_ref() };
        if header.is_marked() {
            return true;
        }
        header.set_marked(true);
        logging::log_mark(header.class());
        self.unlink(ListId::Doomed, header_ptr);
        self.doomed_count.set(self.doomed_count.get().saturating_sub(1));
        self.link_front(ListId::Live, header_ptr);
        self.live_count.set(self.live_count.get() + 1);
        false
    }

    /// Steps 3 and 4 (spec 4.1): frees everything left in doomed, then
    /// clears mark bits on the survivors.
    pub fn sweep(&self) {
        let mut cursor = self.doomed_head.get();
        while let Some(header_ptr) = cursor {
            let next = unsafe { header_ptr.as_ref().next() };
            self.deallocate(header_ptr);
            cursor = next;
        }
        self.doomed_head.set(None);
        self.doomed_count.set(0);

        let mut cursor = self.live_head.get();
        while let Some(header_ptr) = cursor {
            let header = unsafe { header_ptr.as_ref() };
            header.set_marked(false);
            cursor = header.next();
        }
    }

    fn deallocate(&self, header_ptr: NonNull<ObjectHeader>) {
        let header = unsafe { header_ptr.as_ref() };
        if let Some(drop_fn) = header.drop_fn() {
            header.invalidate();
            unsafe { drop_fn(header_ptr) };
        }
    }

    fn tail_of(mut head: NonNull<ObjectHeader>) -> NonNull<ObjectHeader> {
        loop {
            match unsafe { head.as_ref().next() } {
                Some(next) => head = next,
                None => return head,
            }
        }
    }

    fn link_front(&self, list: ListId, header_ptr: NonNull<ObjectHeader>) {
        let head_cell = self.head_cell(list);
        let old_head = head_cell.get();
        unsafe {
            header_ptr.as_ref().set_prev(None);
            header_ptr.as_ref().set_next(old_head);
        }
        if let Some(old) = old_head {
            unsafe { old.as_ref().set_prev(Some(header_ptr)) };
        }
        head_cell.set(Some(header_ptr));
    }

    fn unlink(&self, list: ListId, header_ptr: NonNull<ObjectHeader>) {
        let header = unsafe { header_ptr.as_ref() };
        let prev = header.prev();
        let next = header.next();
        match prev {
            Some(p) => unsafe { p.as_ref().set_next(next) },
            None => self.head_cell(list).set(next),
        }
        if let Some(n) = next {
            unsafe { n.as_ref().set_prev(prev) };
        }
        header.set_prev(None);
        header.set_next(None);
    }

    fn head_cell(&self, list: ListId) -> &Cell<Option<NonNull<ObjectHeader>>> {
        match list {
            ListId::Live => &self.live_head,
            ListId::Doomed => &self.doomed_head,
        }
    }

    /// Heap-wide validation (spec 3.1): walks both lists checking every
    /// header and that the links are mutually consistent.
    pub fn validate(&self) -> Result<()> {
        self.validate_list(self.live_head.get())?;
        self.validate_list(self.doomed_head.get())?;
        Ok(())
    }

    fn validate_list(&self, head: Option<NonNull<ObjectHeader>>) -> Result<()> {
        let mut prev: Option<NonNull<ObjectHeader>> = None;
        let mut cursor = head;
        while let Some(header_ptr) = cursor {
            ObjectHeader::validate(header_ptr.as_ptr())?;
            let header = unsafe { header_ptr.as_ref() };
            if header.prev() != prev {
                return Err(GcError::Corruption {
                    operation: "validate".into(),
                    reason: "broken back-link".into(),
                });
            }
            prev = Some(header_ptr);
            cursor = header.next();
        }
        Ok(())
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

/// Monomorphized per `T`; reconstructs the `Box<T>` from the header
/// pointer (valid since `T::header()` is the first field) and drops it.
unsafe fn drop_glue<T>(header_ptr: NonNull<ObjectHeader>) {
    let raw = header_ptr.as_ptr() as *mut T;
    drop(Box::from_raw(raw));
}
