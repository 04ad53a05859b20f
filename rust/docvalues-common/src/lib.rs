//! Core definitions (error types, result alias and validation macros), relied upon
//! by all docvalues-* crates.

pub mod error;
pub mod result;

pub use result::Result;
