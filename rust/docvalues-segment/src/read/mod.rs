//! Segment doc-values access.

pub mod binary;
pub mod catalog;
pub mod dictionary;
pub mod docs_with_field;
pub mod field;
mod instance_cache;
pub mod numeric;
pub mod producer;
pub mod sorted;
pub mod sorted_set;
pub mod terms_enum;
