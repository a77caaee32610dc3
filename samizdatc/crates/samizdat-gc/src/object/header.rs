//! Object Header - metadata for every GC-managed value.
//!
//! Every live value begins with one of these (spec 3.1): a magic sentinel
//! for heap validation, the two links of the intrusive live/doomed list,
//! a GC mark bit, and the value's class. Payload for the concrete type
//! follows immediately after, matching the reference's `datAllocValue`
//! layout (header first, fixed, payload variable).
//!
//! Single-threaded by design (spec section 5): the mark bit is a plain
//! `Cell<bool>`, not an atomic, and the list links are raw pointers
//! rather than anything requiring synchronization.

use samizdat_util::ClassId;
use std::cell::Cell;
use std::ptr::NonNull;

/// Sentinel written into every header at construction and checked by
/// [`crate::heap::Heap::validate`]. Debug-only: release builds skip the
/// check the same way the reference only asserts `NDEBUG`-gated.
#[cfg(debug_assertions)]
pub const HEADER_MAGIC: u32 = 0x5A4D_4449; // "ZMDI" - arbitrary, just a canary

/// Minimum alignment every concrete value type must uphold so that a
/// `*const ObjectHeader` can be validated for alignment alone.
pub const OBJECT_ALIGNMENT: usize = 8;

/// The fixed-size prefix of every heap value.
///
/// Concrete payload types (`IntData`, `StringData`, `ClassData`, ...) in
/// `samizdat-runtime` put this as their first field and are `#[repr(C)]`,
/// so a `*mut SomeData` can always be reinterpreted as `*mut ObjectHeader`
/// (and back, given the class tag) the way the reference treats every
/// `zvalue` as `union { Value v; SomeData d; }`.
#[repr(C)]
pub struct ObjectHeader {
    #[cfg(debug_assertions)]
    magic: u32,
    /// Previous value in whichever intrusive list (live or doomed)
    /// currently owns this header. `None` at the head of the list.
    prev: Cell<Option<NonNull<ObjectHeader>>>,
    /// Next value in the same list.
    next: Cell<Option<NonNull<ObjectHeader>>>,
    /// GC mark bit. Set during the mark phase, cleared once live values
    /// have been swept back in (spec 4.1 step 4).
    marked: Cell<bool>,
    /// The value's class. Never changes after allocation; classes
    /// themselves carry `class == CLS_CLASS`'s id here, self-referentially
    /// (spec 3.1).
    class: Cell<ClassId>,
    /// Drop glue, monomorphized per concrete payload type at allocation
    /// time (`Heap::alloc`). The heap has no generic type information once
    /// a value is linked into a list, so deallocation goes through this
    /// function pointer rather than a generic destructor.
    drop_fn: Cell<Option<unsafe fn(NonNull<ObjectHeader>)>>,
}

impl ObjectHeader {
    /// Builds a freshly-allocated, unlinked header for `class`. The
    /// caller (`Heap::alloc`) links it into the live list immediately
    /// after construction.
    pub fn new(class: ClassId) -> Self {
        Self {
            #[cfg(debug_assertions)]
            magic: HEADER_MAGIC,
            prev: Cell::new(None),
            next: Cell::new(None),
            marked: Cell::new(false),
            class: Cell::new(class),
            drop_fn: Cell::new(None),
        }
    }

    #[inline]
    pub(crate) fn set_drop_fn(&self, f: unsafe fn(NonNull<ObjectHeader>)) {
        self.drop_fn.set(Some(f));
    }

    #[inline]
    pub(crate) fn drop_fn(&self) -> Option<unsafe fn(NonNull<ObjectHeader>)> {
        self.drop_fn.get()
    }

    #[inline]
    pub fn class(&self) -> ClassId {
        self.class.get()
    }

    /// Only ever called once, by the class bootstrap that creates
    /// `CLS_CLASS` and must patch its own header's class id to itself
    /// after the id is assigned (spec 3.1's "self-referential" class).
    #[inline]
    pub fn set_class(&self, class: ClassId) {
        self.class.set(class);
    }

    #[inline]
    pub fn is_marked(&self) -> bool {
        self.marked.get()
    }

    #[inline]
    pub fn set_marked(&self, marked: bool) {
        self.marked.set(marked);
    }

    #[inline]
    pub(crate) fn prev(&self) -> Option<NonNull<ObjectHeader>> {
        self.prev.get()
    }

    #[inline]
    pub(crate) fn set_prev(&self, p: Option<NonNull<ObjectHeader>>) {
        self.prev.set(p);
    }

    #[inline]
    pub(crate) fn next(&self) -> Option<NonNull<ObjectHeader>> {
        self.next.get()
    }

    #[inline]
    pub(crate) fn set_next(&self, n: Option<NonNull<ObjectHeader>>) {
        self.next.set(n);
    }

    /// Heap validation (spec 3.1): detects a null pointer, mis-alignment,
    /// and (in debug builds) a stale magic sentinel. Broken list links are
    /// checked by [`crate::heap::Heap::validate`], which walks the lists
    /// this header participates in.
    pub fn validate(ptr: *const ObjectHeader) -> Result<(), crate::error::GcError> {
        if ptr.is_null() {
            return Err(crate::error::GcError::InvalidPointer { address: 0 });
        }
        let addr = ptr as usize;
        if addr % OBJECT_ALIGNMENT != 0 {
            return Err(crate::error::GcError::InvalidPointer { address: addr });
        }
        #[cfg(debug_assertions)]
        {
            let magic = unsafe { (*ptr).magic };
            if magic != HEADER_MAGIC {
                return Err(crate::error::GcError::Corruption {
                    operation: "header validation".into(),
                    reason: format!("bad magic {magic:#x} at {addr:#x}"),
                });
            }
        }
        Ok(())
    }

    /// Poisons the header on deallocation so any lingering raw pointer
    /// trips validation rather than reading freed memory silently.
    pub(crate) fn invalidate(&self) {
        #[cfg(debug_assertions)]
        {
            // SAFETY: `self` is about to be dropped by the caller; we only
            // scribble the canary, never read through a dangling pointer.
            let magic_ptr = &self.magic as *const u32 as *mut u32;
            unsafe { *magic_ptr = 0 };
        }
        self.prev.set(None);
        self.next.set(None);
    }
}
