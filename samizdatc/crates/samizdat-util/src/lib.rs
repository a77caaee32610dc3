//! samizdat-util — foundation types shared by the GC and runtime crates.
//!
//! This crate has no knowledge of heap values, classes, or garbage
//! collection; it provides the dependency-free primitives the higher
//! layers build on:
//!
//! - [`symbol`] — name interning ([`symbol::Symbol`], [`symbol::Interner`]),
//!   the primitive the runtime's `Symbol` value type and method-table
//!   indexing are both built from.
//! - [`index_vec`] — [`index_vec::IndexVec`], a `Vec` indexed by a typed
//!   [`index_vec::Idx`] rather than `usize`, used for class method tables
//!   and the class registry.
//! - [`ids`] — the typed indices ([`ids::ClassId`], [`ids::SymbolIndex`])
//!   threaded between `samizdat-gc` and `samizdat-runtime`.
//! - [`error`] — shared `thiserror` error types for the lower layers.

pub mod error;
pub mod ids;
pub mod index_vec;
pub mod symbol;

pub use error::{IndexVecError, SymbolError};
pub use ids::{ClassId, SymbolIndex};
pub use index_vec::{Idx, IndexVec};
pub use symbol::{Interner, Symbol};
