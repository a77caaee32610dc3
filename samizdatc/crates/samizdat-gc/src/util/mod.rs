//! Small helpers shared across this crate.

pub mod alignment;

pub use alignment::Alignment;
