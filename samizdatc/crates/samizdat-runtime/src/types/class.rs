//! `Class` — first-class classes forming a single-inheritance tree (spec
//! 3.2, 4.2).
//!
//! Method tables are *not* copied down from parent to child at creation
//! time; spec 4.2 is explicit that "a class's instance method table is
//! copied down from its parent by inheritance (parent walk, not static
//! copy), so later binding on a parent is visible to children" — so each
//! `ClassData` only ever owns the methods bound directly on it, and
//! [`crate::dispatch`] walks `parent` at call time to resolve inherited
//! ones.

use std::cell::RefCell;
use std::cmp::Ordering;

use samizdat_gc::{Gc, Heap, HeapObject, ObjectHeader, Traceable};
use samizdat_util::index_vec::IndexVec;
use samizdat_util::{ClassId, SymbolIndex};

use crate::macros::impl_heap_object;
use crate::types::symbol::SymbolData;
use crate::types::uniqlet::{self, UniqletData};
use crate::value::Value;

/// Whether a class was bootstrapped as one of the built-ins (`Value`,
/// `Core`, `Data`, `Int`, ...) or created at runtime for user-declared
/// derived data. Distinct from "has a secret": an *opaque* derived class
/// also carries a secret, but is not core. Ordering (spec 3.2) needs both
/// facts, so both are recorded explicitly rather than inferred from one
/// another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassOrigin {
    Core,
    Derived,
}

#[repr(C)]
pub struct ClassData {
    header: ObjectHeader,
    pub parent: Option<Gc<ClassData>>,
    pub name: Gc<SymbolData>,
    pub secret: Option<Gc<UniqletData>>,
    pub id: ClassId,
    pub origin: ClassOrigin,
    instance_methods: RefCell<IndexVec<SymbolIndex, Option<Value>>>,
    class_methods: RefCell<IndexVec<SymbolIndex, Option<Value>>>,
}

impl_heap_object!(ClassData);

impl Traceable for ClassData {
    fn trace(&self, marker: &mut dyn FnMut(*const ObjectHeader)) {
        if let Some(p) = self.parent {
            marker(p.header() as *const ObjectHeader);
        }
        marker(self.name.header() as *const ObjectHeader);
        if let Some(s) = self.secret {
            marker(s.header() as *const ObjectHeader);
        }
        for slot in self.instance_methods.borrow().as_slice() {
            if let Some(v) = slot {
                marker(v.header() as *const ObjectHeader);
            }
        }
        for slot in self.class_methods.borrow().as_slice() {
            if let Some(v) = slot {
                marker(v.header() as *const ObjectHeader);
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn make_class(
    heap: &Heap,
    meta_class: ClassId,
    id: ClassId,
    parent: Option<Gc<ClassData>>,
    name: Gc<SymbolData>,
    secret: Option<Gc<UniqletData>>,
    origin: ClassOrigin,
) -> Gc<ClassData> {
    heap.alloc(ClassData {
        header: ObjectHeader::new(meta_class),
        parent,
        name,
        secret,
        id,
        origin,
        instance_methods: RefCell::new(IndexVec::new()),
        class_methods: RefCell::new(IndexVec::new()),
    })
}

/// Binds `selector` to `method` on this class's own instance method
/// table (not inherited — see the module doc comment).
pub fn bind_instance_method(class: Gc<ClassData>, selector: SymbolIndex, method: Value) {
    bind(&class.instance_methods, selector, method);
}

pub fn bind_class_method(class: Gc<ClassData>, selector: SymbolIndex, method: Value) {
    bind(&class.class_methods, selector, method);
}

fn bind(table: &RefCell<IndexVec<SymbolIndex, Option<Value>>>, selector: SymbolIndex, method: Value) {
    let mut table = table.borrow_mut();
    let needed = selector.0 as usize + 1;
    while table.len() < needed {
        table.push(None);
    }
    table[selector] = Some(method);
}

/// Looks up a method bound directly on this class (no parent walk); used
/// by [`crate::dispatch`], which performs the walk itself.
pub fn own_instance_method(class: Gc<ClassData>, selector: SymbolIndex) -> Option<Value> {
    class.instance_methods.borrow().get(selector).copied().flatten()
}

pub fn own_class_method(class: Gc<ClassData>, selector: SymbolIndex) -> Option<Value> {
    class.class_methods.borrow().get(selector).copied().flatten()
}

/// Whether `ancestor` appears in `class`'s parent chain (inclusive),
/// backing `hasClass` (spec 6, 8).
pub fn is_descendant_of(mut class: Gc<ClassData>, ancestor: Gc<ClassData>) -> bool {
    loop {
        if class.as_ptr() == ancestor.as_ptr() {
            return true;
        }
        match class.parent {
            Some(p) => class = p,
            None => return false,
        }
    }
}

/// `classCompare` (spec 3.2, `Class.c`): core before derived; within
/// derived, by name; ties among derived classes sharing a name (possible
/// only between two *opaque* classes, since transparent derived classes
/// are deduplicated by name at creation) broken by secret identity.
pub fn total_order(
    a: Gc<ClassData>,
    b: Gc<ClassData>,
    name_order: impl Fn(Gc<SymbolData>, Gc<SymbolData>) -> Option<Ordering>,
) -> Option<Ordering> {
    if a.as_ptr() == b.as_ptr() {
        return Some(Ordering::Equal);
    }
    match (a.origin, b.origin) {
        (ClassOrigin::Core, ClassOrigin::Derived) => return Some(Ordering::Less),
        (ClassOrigin::Derived, ClassOrigin::Core) => return Some(Ordering::Greater),
        _ => {}
    }
    match name_order(a.name, b.name) {
        Some(Ordering::Equal) | None => match (a.secret, b.secret) {
            (Some(sa), Some(sb)) => Some(uniqlet::identity_order(sa, sb)),
            _ => None,
        },
        ord => ord,
    }
}
