//! Persisted layout of the doc-values segment streams: constants, the versioned
//! stream header, the checksum footer and the checksum primitive.

pub mod checksum;
pub mod defs;
pub mod footer;
pub mod header;
