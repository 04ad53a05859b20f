//! # Doc values: per-segment columnar field storage
//!
//! Doc values are the per-document, column-oriented values of an inverted-index
//! segment: one numeric, binary, sorted or sorted-set value (or value list) per
//! document and field, stored next to the postings. This crate is the entry point
//! to their read path and re-exports the component crates.
//!
//! ## Module Organization
//!
//! * [`segment`] - The producer, which opens a segment's metadata and data streams
//!   and serves its columns, plus the column and terms-enumeration types
//! * [`format`] - Stream headers, footers, checksums and format constants
//! * [`io`] - Positional reads and the sequential little-endian decoder
//! * [`objectstore`] - Named stream storage, in memory and on the local file system
//! * [`common`] - Error and result types
//!
//! ### Support Modules
//!
//! * [`support::bits`] - Packed integer readers and document bitsets
//!
//! ## Getting Started
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use docvalues::objectstore::LocalFsObjectStore;
//! use docvalues::segment::read::{
//!     field::{DocValuesType, FieldInfo, FieldInfos, SegmentReadState},
//!     producer::ProducerOptions,
//! };
//!
//! # fn main() -> docvalues::common::Result<()> {
//! let store = Arc::new(LocalFsObjectStore::new("/data/index".as_ref())?);
//! let fields = Arc::new(FieldInfos::new([FieldInfo::new(
//!     "price",
//!     0,
//!     DocValuesType::Numeric,
//! )])?);
//! let state = SegmentReadState::new("_0", 1000, fields.clone());
//! let producer = ProducerOptions::new(store).open(&state)?;
//! let prices = producer.get_numeric(&fields.by_number(0).unwrap())?;
//! println!("{}", prices.get(17));
//! producer.close()?;
//! # Ok(())
//! # }
//! ```

pub use docvalues_common as common;
pub use docvalues_format as format;
pub use docvalues_io as io;
pub use docvalues_objectstore as objectstore;
pub use docvalues_segment as segment;

pub mod support {
    pub use docvalues_bits as bits;
}
