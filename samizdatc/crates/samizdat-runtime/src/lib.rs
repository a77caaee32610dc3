//! `samizdat-runtime` — classes and dispatch, symbols-as-values, the
//! built-in collection types, boxes, frames and closures, jumps, the
//! executable-node interpreter, and the embedding API spec section 6
//! describes (value construction, accessors, dispatch, execution,
//! roots, lifecycle).
//!
//! Built on `samizdat-gc` (heap, roots, collector) and `samizdat-util`
//! (symbol interning, typed ids); this crate is where every concrete
//! built-in class and the tree-walking interpreter itself live.
//!
//! # Modules
//!
//! - [`value`] — the uniform [`value::Value`] handle (spec 3.1, 3.4).
//! - [`types`] — one module per built-in class's heap payload (spec 4.4–4.7).
//! - [`runtime`] — [`runtime::Runtime`], the process-wide handle owning
//!   the heap, class registry, symbol interner, and caches (spec 9).
//! - [`dispatch`] — `call`/`methodCall`/`apply` (spec 4.2).
//! - [`frame`] — lexical frames (spec 3.5).
//! - [`formals`] — formal-argument shapes and binding (spec 4.6.2).
//! - [`interp`] — source-node translation and execution (spec 4.6).
//! - [`ordering`] — universal `totalEq`/`totalOrder`/`debugString` (spec 3.4, 8).
//! - [`init`] — leaf-first module-init dependency sequencing (spec section 2).
//! - [`error`] — [`error::RuntimeError`], [`error::Flow`] (spec section 7).

pub(crate) mod macros;

pub mod dispatch;
pub mod error;
pub mod formals;
pub mod frame;
pub mod init;
pub mod interp;
pub mod ordering;
pub mod runtime;
pub mod types;
pub mod value;

pub use dispatch::{apply, call, method_call};
pub use error::{EvalResult, Flow, JumpUnwind, Result, RuntimeError};
pub use interp::{call_closure, eval, translate, ExecNode};
pub use runtime::{ClassIds, Runtime};
pub use value::Value;
