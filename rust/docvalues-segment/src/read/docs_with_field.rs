//! Presence bitsets: which documents have a value for a field.
//!
//! Numeric and binary columns persist a bitset next to their data (or none, when
//! every document has a value). Sorted and sorted-set columns derive presence from
//! their ordinals.

use std::sync::Arc;

use docvalues_bits::{Bits, FixedBitSet};
use docvalues_common::Result;
use docvalues_io::DataInput;

use super::{binary::BinaryDocValues, numeric::NumericDocValues};

/// Reads the persisted bitset of `missing_bytes` bytes at `missing_offset`.
pub fn load_bitset(
    input: &mut DataInput,
    missing_offset: u64,
    missing_bytes: u64,
    doc_count: u32,
) -> Result<FixedBitSet> {
    input.seek(missing_offset)?;
    FixedBitSet::read(input, missing_bytes, doc_count as usize)
}

/// Presence of a sorted field: documents with an ordinal `>= 0`.
pub struct SortedPresence {
    ords: Arc<NumericDocValues>,
    doc_count: u32,
}

impl SortedPresence {
    pub fn new(ords: Arc<NumericDocValues>, doc_count: u32) -> SortedPresence {
        SortedPresence { ords, doc_count }
    }
}

impl Bits for SortedPresence {
    fn get(&self, index: usize) -> bool {
        self.ords.get(index as u32) >= 0
    }

    fn len(&self) -> usize {
        self.doc_count as usize
    }
}

/// Presence of a sorted-set field: documents with a non-empty ordinal list.
pub struct SortedSetPresence {
    lists: Arc<BinaryDocValues>,
    doc_count: u32,
}

impl SortedSetPresence {
    pub fn new(lists: Arc<BinaryDocValues>, doc_count: u32) -> SortedSetPresence {
        SortedSetPresence { lists, doc_count }
    }
}

impl Bits for SortedSetPresence {
    fn get(&self, index: usize) -> bool {
        !self.lists.get(index as u32).is_empty()
    }

    fn len(&self) -> usize {
        self.doc_count as usize
    }
}
