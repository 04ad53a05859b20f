//! Binary column decoders.

use bytes::Bytes;
use docvalues_bits::MonotonicBlockPackedReader;
use docvalues_common::{Result, error::Error};
use docvalues_io::DataInput;

use super::catalog::BinaryEntry;

/// Immutable random-access view of a binary column: one byte string per document.
///
/// Both variants own their bytes; nothing refers back to the stream they were
/// loaded from.
#[derive(Debug)]
pub enum BinaryDocValues {
    /// Every value has the same length.
    Fixed { bytes: Bytes, len: usize },
    /// Value `doc` spans `[end(doc - 1), end(doc))` of `bytes`, with `end(-1) = 0`.
    Variable {
        bytes: Bytes,
        ends: MonotonicBlockPackedReader,
    },
}

impl BinaryDocValues {
    pub fn load(input: &mut DataInput, entry: &BinaryEntry, doc_count: u32) -> Result<Self> {
        input.seek(entry.offset)?;
        let bytes = input.read_bytes(entry.num_bytes as usize)?;
        match entry.addressing {
            None => {
                let len = entry.min_length as usize;
                if (len as u64) * (doc_count as u64) > entry.num_bytes {
                    return Err(Error::corruption(
                        input.name(),
                        format!(
                            "fixed-width column of {doc_count} x {len} bytes exceeds its {} byte blob",
                            entry.num_bytes
                        ),
                    ));
                }
                Ok(BinaryDocValues::Fixed { bytes, len })
            }
            Some(addressing) => {
                input.skip(entry.missing_bytes)?;
                let ends = MonotonicBlockPackedReader::read(
                    input,
                    addressing.packed_version,
                    addressing.block_size,
                    doc_count as usize,
                )?;
                validate_ends(&ends, entry, input.name())?;
                Ok(BinaryDocValues::Variable { bytes, ends })
            }
        }
    }

    /// Returns the value of document `doc`.
    ///
    /// # Panics
    ///
    /// Panics if `doc` is not below the segment's document count.
    #[inline]
    pub fn get(&self, doc: u32) -> &[u8] {
        let doc = doc as usize;
        match self {
            BinaryDocValues::Fixed { bytes, len } => &bytes[doc * len..(doc + 1) * len],
            BinaryDocValues::Variable { bytes, ends } => {
                let start = if doc == 0 { 0 } else { ends.get(doc - 1) };
                let end = ends.get(doc);
                &bytes[start as usize..end as usize]
            }
        }
    }

    pub fn ram_bytes_used(&self) -> usize {
        std::mem::size_of::<Self>()
            + match self {
                BinaryDocValues::Fixed { bytes, .. } => bytes.len(),
                BinaryDocValues::Variable { bytes, ends } => bytes.len() + ends.ram_bytes_used(),
            }
    }
}

/// Address tables must be non-decreasing, start within the blob and stay within the
/// declared length bounds, so that `get` can slice without further checks.
fn validate_ends(ends: &MonotonicBlockPackedReader, entry: &BinaryEntry, name: &str) -> Result<()> {
    let mut prev = 0i64;
    for doc in 0..ends.len() {
        let end = ends.get(doc);
        let len = end.wrapping_sub(prev);
        if end < prev
            || end as u64 > entry.num_bytes
            || len > entry.max_length as i64
            || len < entry.min_length as i64
        {
            return Err(Error::corruption(
                name,
                format!("invalid address {end} for document {doc} (previous {prev})"),
            ));
        }
        prev = end;
    }
    Ok(())
}
