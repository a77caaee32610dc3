//! Error types for the heap and collector.
//!
//! Every variant corresponds to one of the fatal-error kinds spec section
//! 7 describes for the runtime as a whole (bad-value, resource
//! exhaustion, corruption). `samizdat-runtime` converts these into its
//! own `RuntimeError` at the embedding boundary; nothing in this crate
//! panics on a data path.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GcError {
    #[error("out of memory: requested {requested} bytes")]
    OutOfMemory { requested: usize },

    #[error("invalid heap pointer at {address:#x}")]
    InvalidPointer { address: usize },

    #[error("heap corruption detected during {operation}: {reason}")]
    Corruption { operation: String, reason: String },

    #[error("too many immortals: limit is {limit}")]
    TooManyImmortals { limit: usize },

    #[error("root stack exhausted: depth exceeded {limit}")]
    StackOverflow { limit: usize },
}

pub type Result<T> = std::result::Result<T, GcError>;
