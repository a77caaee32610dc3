//! Boilerplate shared by every heap payload type in `types/`.

/// Implements `samizdat_gc::HeapObject` for a `#[repr(C)]` struct whose
/// first field is named `header`. Every concrete value type in
/// [`crate::types`] uses this instead of hand-writing the same
/// one-liner repeatedly.
macro_rules! impl_heap_object {
    ($ty:ty) => {
        unsafe impl samizdat_gc::HeapObject for $ty {
            #[inline]
            fn header(&self) -> &samizdat_gc::ObjectHeader {
                &self.header
            }
        }
    };
}

pub(crate) use impl_heap_object;
