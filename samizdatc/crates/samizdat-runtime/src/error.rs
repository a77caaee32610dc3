//! Runtime-wide error type (spec section 7).
//!
//! Every fatal-error kind the spec names — bad-value, bad-operation,
//! bad-input, resource-exhaustion — is a variant here. Nothing in this
//! crate panics or calls `.unwrap()`/`.expect()` on a data path; a
//! `RuntimeError` propagates with `?` up to the embedding boundary
//! (`eval`, `call`), which is the only place that turns it into the
//! "print a diagnostic and terminate" behavior the spec mandates.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("bad value: {0}")]
    BadValue(String),

    #[error("bad operation: {0}")]
    BadOperation(String),

    #[error("bad input: {0}")]
    BadInput(String),

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("no method '{selector}' found for class {class}")]
    UnresolvedMethod { class: String, selector: String },

    #[error("wrong arity calling {name}: expected {min}..{max:?}, got {got}")]
    Arity { name: String, min: usize, max: Option<usize>, got: usize },
}

impl RuntimeError {
    pub fn bad_value(msg: impl Into<String>) -> Self {
        Self::BadValue(msg.into())
    }
    pub fn bad_operation(msg: impl Into<String>) -> Self {
        Self::BadOperation(msg.into())
    }
    pub fn bad_input(msg: impl Into<String>) -> Self {
        Self::BadInput(msg.into())
    }
    pub fn resource_exhausted(msg: impl Into<String>) -> Self {
        Self::ResourceExhausted(msg.into())
    }
}

impl From<samizdat_gc::GcError> for RuntimeError {
    fn from(e: samizdat_gc::GcError) -> Self {
        use samizdat_gc::GcError::*;
        match e {
            OutOfMemory { requested } => {
                RuntimeError::resource_exhausted(format!("out of memory ({requested} bytes)"))
            }
            InvalidPointer { address } => {
                RuntimeError::bad_value(format!("invalid heap pointer {address:#x}"))
            }
            Corruption { operation, reason } => {
                RuntimeError::bad_value(format!("heap corruption during {operation}: {reason}"))
            }
            TooManyImmortals { limit } => {
                RuntimeError::resource_exhausted(format!("too many immortals (limit {limit})"))
            }
            StackOverflow { limit } => {
                RuntimeError::resource_exhausted(format!("root stack depth exceeded {limit}"))
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// A non-local jump in flight, distinct from an error per spec section 7
/// ("a recovery mechanism for user code, not an error signal"). Carried
/// alongside `RuntimeError` in [`Flow`] so both can propagate through the
/// interpreter with a single `?`.
#[derive(Debug, Clone)]
pub struct JumpUnwind {
    pub jump_id: u64,
    pub value: Option<crate::value::Value>,
}

/// Control-flow signal threaded through statement execution: either a
/// fatal error, or an in-flight non-local jump looking for its arming
/// frame. This is the idiomatic-Rust rendering of the reference's
/// `sigsetjmp`/`siglongjmp` pair (spec 4.7, 9): a jump unwinds purely by
/// returning `Err(Flow::Jump(..))` up through ordinary `?` propagation
/// until the frame that armed it catches the matching id.
#[derive(Debug, Clone)]
pub enum Flow {
    Error(RuntimeError),
    Jump(JumpUnwind),
}

impl From<RuntimeError> for Flow {
    fn from(e: RuntimeError) -> Self {
        Flow::Error(e)
    }
}

/// `None` renders the spec's *void* — the absence of a value, distinct
/// from any value including null-like ones (GLOSSARY). Every statement
/// shape and dispatch entry point threads void this way rather than
/// inventing a sentinel `Value` variant for it.
pub type EvalResult = std::result::Result<Option<crate::value::Value>, Flow>;
