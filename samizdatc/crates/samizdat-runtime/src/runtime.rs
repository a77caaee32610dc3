//! The global, single-threaded runtime handle (spec section 5's
//! single-threaded process model; spec 9's "process-wide state").
//!
//! Owns the heap, root set, symbol interner, class registry, and the
//! process-wide caches spec 3.4/4.4.2 describe (small-int singletons,
//! single-char strings, empty-container singletons, the map lookup
//! cache). Bootstrapping the built-in class tree — spec 2 step 3 —
//! happens once, in [`Runtime::new`]; [`crate::init`] sequences anything
//! built on top of it (standard-library-style module init is out of
//! scope here per spec section 1, so the graph this crate ships only
//! orders the core's own internal setup).

use std::cell::{Cell, RefCell};
use std::ptr::NonNull;

use rustc_hash::FxHashMap;

use samizdat_gc::{Heap, HeapObject, ObjectHeader, Roots};
use samizdat_util::ids::IdGenerator;
use samizdat_util::{ClassId, Interner, SymbolIndex};

use crate::types::boxed::BoxData;
use crate::types::builtin::BuiltinData;
use crate::types::class::{self, ClassData, ClassOrigin};
use crate::types::closure::ClosureData;
use crate::types::int::IntData;
use crate::types::jump::JumpData;
use crate::types::list::{self, ListData};
use crate::types::map::MapData;
use crate::types::record::RecordData;
use crate::types::string::{self, StringData};
use crate::types::symbol::{self, SymbolData};
use crate::types::symbol_table::{self, SymbolTableData};
use crate::types::uniqlet::UniqletData;
use crate::value::Value;

/// Which concrete heap layout a class id addresses — the dispatch table
/// the garbage collector needs to know how to [`samizdat_gc::Traceable::trace`]
/// a value given only its header, since `samizdat-gc` is deliberately
/// ignorant of concrete classes (see that crate's module doc comment).
#[derive(Clone, Copy)]
enum Shape {
    Int,
    Str,
    Symbol,
    List,
    Map,
    SymbolTable,
    Record,
    Uniqlet,
    Boxed,
    Class,
    Closure,
    Builtin,
    Jump,
    Frame,
}

pub struct ClassIds {
    pub value: ClassId,
    pub core: ClassId,
    pub data: ClassId,
    pub int: ClassId,
    pub string: ClassId,
    pub symbol: ClassId,
    pub list: ClassId,
    pub map: ClassId,
    pub symbol_table: ClassId,
    pub record: ClassId,
    pub uniqlet: ClassId,
    pub jump: ClassId,
    pub box_: ClassId,
    pub builtin: ClassId,
    pub closure: ClassId,
    pub class: ClassId,
    pub frame: ClassId,
}

struct LookupEntry {
    map_ptr: usize,
    key_ptr: usize,
    value: Value,
}

const LOOKUP_CACHE_SIZE: usize = 256;
const SMALL_CHAR_MAX: u32 = 255;

pub struct Runtime {
    heap: Heap,
    roots: Roots,
    interner: Interner,
    class_ids: ClassIds,
    class_table: RefCell<FxHashMap<ClassId, samizdat_gc::Gc<ClassData>>>,
    shapes: RefCell<FxHashMap<ClassId, Shape>>,
    class_id_gen: IdGenerator<ClassId>,
    jump_id_gen: Cell<u64>,
    small_ints: RefCell<FxHashMap<i64, Value>>,
    chars: RefCell<FxHashMap<char, Value>>,
    empty_list: Value,
    empty_map: Value,
    empty_symbol_table: Value,
    empty_string: Value,
    call_selector: SymbolIndex,
    /// Spec 4.4.2/5's process-wide map lookup cache: "hashed on the pair
    /// (mapPtr, keyPtr), invalidated by clearing during GC". Rendered here
    /// as a plain fixed-size direct-mapped array cleared at the start of
    /// every [`Runtime::collect`] rather than as a dedicated immortal
    /// value with its own `gcMark` — this crate's collector callback
    /// already has a single well-known entry point to hook that into, so
    /// a second GC-visible singleton buys nothing.
    lookup_cache: RefCell<Vec<Option<LookupEntry>>>,
    /// Host-registered modules (spec 6's embedding API, `@importModule`
    /// source nodes): the module system's own resolution mechanics are
    /// a host concern, not this core's — this is just the registry
    /// `Runtime::register_module`/`resolve_module` read and write.
    modules: RefCell<FxHashMap<String, Value>>,
}

impl Runtime {
    pub fn new() -> Self {
        let heap = Heap::new();
        let roots = Roots::new(1 << 20, 1 << 20);
        let interner = Interner::new();
        let class_id_gen: IdGenerator<ClassId> = IdGenerator::new();
        let mut shapes: FxHashMap<ClassId, Shape> = FxHashMap::default();
        let mut class_table: FxHashMap<ClassId, samizdat_gc::Gc<ClassData>> = FxHashMap::default();

        let name_of = |n: &str| symbol::alloc(&heap, ClassId(0), interner.intern(n));

        // Bootstrap order mirrors spec 2 step 3's built-in class list.
        // `Class` is its own class (spec 3.1: "the class Class has class
        // Class"), so its id is reserved first and fed back into its own
        // construction.
        let class_id = class_id_gen.next();
        let value_id = class_id_gen.next();
        let core_id = class_id_gen.next();
        let data_id = class_id_gen.next();
        let int_id = class_id_gen.next();
        let string_id = class_id_gen.next();
        let symbol_id = class_id_gen.next();
        let list_id = class_id_gen.next();
        let map_id = class_id_gen.next();
        let symbol_table_id = class_id_gen.next();
        let record_id = class_id_gen.next();
        let uniqlet_id = class_id_gen.next();
        let jump_id = class_id_gen.next();
        let box_id = class_id_gen.next();
        let builtin_id = class_id_gen.next();
        let closure_id = class_id_gen.next();
        let frame_id = class_id_gen.next();

        shapes.insert(class_id, Shape::Class);
        shapes.insert(int_id, Shape::Int);
        shapes.insert(string_id, Shape::Str);
        shapes.insert(symbol_id, Shape::Symbol);
        shapes.insert(list_id, Shape::List);
        shapes.insert(map_id, Shape::Map);
        shapes.insert(symbol_table_id, Shape::SymbolTable);
        shapes.insert(record_id, Shape::Record);
        shapes.insert(uniqlet_id, Shape::Uniqlet);
        shapes.insert(box_id, Shape::Boxed);
        shapes.insert(builtin_id, Shape::Builtin);
        shapes.insert(closure_id, Shape::Closure);
        shapes.insert(jump_id, Shape::Jump);
        shapes.insert(frame_id, Shape::Frame);

        // `Value`, `Core`, `Data` have no concrete payload of their own —
        // they never appear as a `Value` variant's own class id (every
        // leaf class above is what a value actually allocates as) — so
        // they get no `Shape` entry; nothing is ever traced "as a Value".
        let value = class::make_class(&heap, class_id, value_id, None, name_of("Value"), None, ClassOrigin::Core);
        let core = class::make_class(&heap, class_id, core_id, Some(value), name_of("Core"), None, ClassOrigin::Core);
        let data = class::make_class(&heap, class_id, data_id, Some(core), name_of("Data"), None, ClassOrigin::Core);
        let class_class =
            class::make_class(&heap, class_id, class_id, Some(core), name_of("Class"), None, ClassOrigin::Core);

        let mut leaf = |id: ClassId, name: &str| {
            class::make_class(&heap, class_id, id, Some(data), name_of(name), None, ClassOrigin::Core)
        };
        let int_class = leaf(int_id, "Int");
        let string_class = leaf(string_id, "String");
        let symbol_class = leaf(symbol_id, "Symbol");
        let list_class = leaf(list_id, "List");
        let map_class = leaf(map_id, "Map");
        let symbol_table_class = leaf(symbol_table_id, "SymbolTable");
        let record_class = leaf(record_id, "Record");
        let uniqlet_class = leaf(uniqlet_id, "Uniqlet");
        let jump_class = leaf(jump_id, "Jump");
        let box_class = leaf(box_id, "Box");
        let builtin_class = leaf(builtin_id, "Builtin");
        let closure_class = leaf(closure_id, "Closure");

        for (id, c) in [
            (value_id, value),
            (core_id, core),
            (data_id, data),
            (class_id, class_class),
            (int_id, int_class),
            (string_id, string_class),
            (symbol_id, symbol_class),
            (list_id, list_class),
            (map_id, map_class),
            (symbol_table_id, symbol_table_class),
            (record_id, record_class),
            (uniqlet_id, uniqlet_class),
            (jump_id, jump_class),
            (box_id, box_class),
            (builtin_id, builtin_class),
            (closure_id, closure_class),
        ] {
            roots.immortalize(header_of(c)).expect("bootstrap immortal budget");
            class_table.insert(id, c);
        }

        let empty_list = Value::List(list::from_array(&heap, list_id, vec![]));
        let empty_map = Value::Map(crate::types::map::from_array(&heap, map_id, vec![], &|_, _| std::cmp::Ordering::Equal));
        let empty_symbol_table =
            Value::SymbolTable(symbol_table::from_array(&heap, symbol_table_id, vec![]).expect("empty symtab"));
        let empty_string = Value::Str(string::from_utf8(&heap, string_id, ""));
        for v in [empty_list, empty_map, empty_symbol_table, empty_string] {
            roots.immortalize(header_of_value(v)).expect("bootstrap immortal budget");
        }

        let mut small_ints = FxHashMap::default();
        for v in crate::types::int::SMALL_INT_MIN..=crate::types::int::SMALL_INT_MAX {
            let n = Value::Int(crate::types::int::alloc(&heap, int_id, v));
            roots.immortalize(header_of_value(n)).expect("bootstrap immortal budget");
            small_ints.insert(v, n);
        }

        let mut chars = FxHashMap::default();
        for cp in 0..=SMALL_CHAR_MAX {
            if let Some(c) = char::from_u32(cp) {
                let s = Value::Str(string::from_utf8(&heap, string_id, &c.to_string()));
                roots.immortalize(header_of_value(s)).expect("bootstrap immortal budget");
                chars.insert(c, s);
            }
        }

        let call_selector = SymbolIndex(interner.intern("call").index());

        Self {
            heap,
            roots,
            interner,
            class_ids: ClassIds {
                value: value_id,
                core: core_id,
                data: data_id,
                int: int_id,
                string: string_id,
                symbol: symbol_id,
                list: list_id,
                map: map_id,
                symbol_table: symbol_table_id,
                record: record_id,
                uniqlet: uniqlet_id,
                jump: jump_id,
                box_: box_id,
                builtin: builtin_id,
                closure: closure_id,
                class: class_id,
                frame: frame_id,
            },
            class_table: RefCell::new(class_table),
            shapes: RefCell::new(shapes),
            class_id_gen,
            jump_id_gen: Cell::new(0),
            small_ints: RefCell::new(small_ints),
            chars: RefCell::new(chars),
            empty_list,
            empty_map,
            empty_symbol_table,
            empty_string,
            call_selector,
            lookup_cache: RefCell::new((0..LOOKUP_CACHE_SIZE).map(|_| None).collect()),
            modules: RefCell::new(FxHashMap::default()),
        }
    }

    pub fn register_module(&self, name: impl Into<String>, value: Value) {
        self.modules.borrow_mut().insert(name.into(), value);
    }

    pub fn resolve_module(&self, name: &str) -> Option<Value> {
        self.modules.borrow().get(name).copied()
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn roots(&self) -> &Roots {
        &self.roots
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn classes(&self) -> &ClassIds {
        &self.class_ids
    }

    pub fn call_selector(&self) -> SymbolIndex {
        self.call_selector
    }

    pub fn class_of(&self, id: ClassId) -> samizdat_gc::Gc<ClassData> {
        *self
            .class_table
            .borrow()
            .get(&id)
            .expect("class id referenced before it was registered")
    }

    /// Registers a user-declared ("derived") class, per spec 3.2's
    /// "created once at bootstrap or on first reference (for
    /// derived-data classes)". Callers choose a `shape` matching which
    /// `Value` variant instances of this class actually allocate as
    /// (most derived classes reuse `Record`'s payload shape).
    pub fn register_derived_class(
        &self,
        parent: samizdat_gc::Gc<ClassData>,
        name: samizdat_gc::Gc<SymbolData>,
        secret: Option<samizdat_gc::Gc<UniqletData>>,
        reuses_record_shape: bool,
    ) -> samizdat_gc::Gc<ClassData> {
        let id = self.class_id_gen.next();
        let c = class::make_class(&self.heap, self.class_ids.class, id, Some(parent), name, secret, ClassOrigin::Derived);
        self.roots.immortalize(header_of(c)).expect("too many classes");
        self.class_table.borrow_mut().insert(id, c);
        if reuses_record_shape {
            self.shapes.borrow_mut().insert(id, Shape::Record);
        }
        c
    }

    pub fn next_jump_id(&self) -> u64 {
        let id = self.jump_id_gen.get();
        self.jump_id_gen.set(id + 1);
        id
    }

    /// Small-int singleton cache (spec 3.4). Values outside the cached
    /// range are allocated fresh and are the caller's responsibility to
    /// root.
    pub fn small_int(&self, value: i64) -> Option<Value> {
        self.small_ints.borrow().get(&value).copied()
    }

    pub fn cached_char_string(&self, c: char) -> Option<Value> {
        self.chars.borrow().get(&c).copied()
    }

    pub fn empty_list(&self) -> Value {
        self.empty_list
    }
    pub fn empty_map(&self) -> Value {
        self.empty_map
    }
    pub fn empty_symbol_table(&self) -> Value {
        self.empty_symbol_table
    }
    pub fn empty_string(&self) -> Value {
        self.empty_string
    }

    pub fn lookup_cache_get(&self, map: Value, key: Value) -> Option<Value> {
        let slot = Self::lookup_cache_slot(map, key);
        match &self.lookup_cache.borrow()[slot] {
            Some(e) if e.map_ptr == map.header() as *const _ as usize && e.key_ptr == key.header() as *const _ as usize => {
                Some(e.value)
            }
            _ => None,
        }
    }

    pub fn lookup_cache_put(&self, map: Value, key: Value, value: Value) {
        let slot = Self::lookup_cache_slot(map, key);
        self.lookup_cache.borrow_mut()[slot] = Some(LookupEntry {
            map_ptr: map.header() as *const _ as usize,
            key_ptr: key.header() as *const _ as usize,
            value,
        });
    }

    fn lookup_cache_slot(map: Value, key: Value) -> usize {
        let m = map.header() as *const _ as usize;
        let k = key.header() as *const _ as usize;
        (m.wrapping_mul(31).wrapping_add(k)) % LOOKUP_CACHE_SIZE
    }

    /// Runs one collection cycle (spec 4.1), clearing the lookup cache
    /// first since it is "invalidated by clearing during GC" (spec
    /// 4.4.2/5).
    pub fn collect(&self) -> usize {
        for slot in self.lookup_cache.borrow_mut().iter_mut() {
            *slot = None;
        }
        samizdat_gc::gc::collect(&self.heap, &self.roots, |h| self.mark_one(h))
    }

    pub fn maybe_collect(&self, threshold: usize) {
        if samizdat_gc::gc::should_collect(&self.heap, threshold) {
            self.collect();
        }
    }

    fn mark_one(&self, h: NonNull<ObjectHeader>) {
        if self.heap.mark(h) {
            return;
        }
        let class = unsafe { h.as_ref() }.class();
        let shape = *self.shapes.borrow().get(&class).expect("untraced class shape");
        macro_rules! trace_as {
            ($ty:ty) => {{
                let obj = unsafe { &*(h.as_ptr() as *const $ty) };
                obj.trace(&mut |child| self.mark_one(unsafe { NonNull::new_unchecked(child as *mut _) }));
            }};
        }
        match shape {
            Shape::Int => trace_as!(IntData),
            Shape::Str => trace_as!(StringData),
            Shape::Symbol => trace_as!(SymbolData),
            Shape::List => trace_as!(ListData),
            Shape::Map => trace_as!(MapData),
            Shape::SymbolTable => trace_as!(SymbolTableData),
            Shape::Record => trace_as!(RecordData),
            Shape::Uniqlet => trace_as!(UniqletData),
            Shape::Boxed => trace_as!(BoxData),
            Shape::Class => trace_as!(ClassData),
            Shape::Closure => trace_as!(ClosureData),
            Shape::Builtin => trace_as!(BuiltinData),
            Shape::Jump => trace_as!(JumpData),
            Shape::Frame => trace_as!(crate::frame::FrameData),
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

fn header_of<T: HeapObject>(g: samizdat_gc::Gc<T>) -> NonNull<ObjectHeader> {
    unsafe { NonNull::new_unchecked(g.header() as *const _ as *mut _) }
}

fn header_of_value(v: Value) -> NonNull<ObjectHeader> {
    unsafe { NonNull::new_unchecked(v.header() as *const _ as *mut _) }
}
