//! Numeric column decoders.

use bytes::Bytes;
use docvalues_bits::{BlockPackedReader, PackedReader};
use docvalues_common::{Result, error::Error};
use docvalues_format::defs::MAX_TABLE_SIZE;
use docvalues_io::DataInput;

use super::catalog::{NumericEncoding, NumericEntry};

/// Largest bit width of a table-compressed ordinal.
const MAX_TABLE_BITS: i32 = 8;

/// Immutable random-access view of a numeric column: one `i64` per document.
///
/// The variant is chosen once, at load time, from the column's encoding.
#[derive(Debug)]
pub enum NumericDocValues {
    /// A small table of distinct values indexed by a packed per-document ordinal.
    Table {
        table: Box<[i64]>,
        ords: PackedReader,
    },
    /// Block-packed values.
    Delta(BlockPackedReader),
    /// One signed byte per document.
    Uncompressed(Bytes),
    /// `min + mult * quotient`, with block-packed quotients.
    Gcd {
        min: i64,
        mult: i64,
        quotients: BlockPackedReader,
    },
}

impl NumericDocValues {
    /// Loads the column described by `entry`. `input` may be positioned anywhere;
    /// the encoded values are read from `entry.offset + entry.missing_bytes`.
    pub fn load(input: &mut DataInput, entry: &NumericEntry, doc_count: u32) -> Result<Self> {
        input.seek(entry.offset + entry.missing_bytes)?;
        let count = doc_count as usize;
        let values = match entry.encoding {
            NumericEncoding::Table => {
                let packed_version = packed_version(entry, input)?;
                let size = input.read_vint()?;
                if size < 0 || size as usize > MAX_TABLE_SIZE {
                    return Err(Error::corruption(
                        input.name(),
                        format!(
                            "table-compressed column cannot have more than {MAX_TABLE_SIZE} distinct values, got {size}"
                        ),
                    ));
                }
                let mut table = Vec::with_capacity(size as usize);
                for _ in 0..size {
                    table.push(input.read_i64()?);
                }
                let bits_per_value = input.read_vint()?;
                if !(0..=MAX_TABLE_BITS).contains(&bits_per_value) {
                    return Err(Error::corruption(
                        input.name(),
                        format!("invalid table ordinal width {bits_per_value}"),
                    ));
                }
                // Every representable ordinal must decode.
                table.resize(table.len().max(1 << bits_per_value), 0);
                let ords =
                    PackedReader::read(input, packed_version, count, bits_per_value as u32)?;
                NumericDocValues::Table {
                    table: table.into_boxed_slice(),
                    ords,
                }
            }
            NumericEncoding::Delta => {
                let packed_version = packed_version(entry, input)?;
                let block_size = input.read_vint()?;
                NumericDocValues::Delta(BlockPackedReader::read(
                    input,
                    packed_version,
                    block_size,
                    count,
                )?)
            }
            NumericEncoding::Uncompressed => {
                NumericDocValues::Uncompressed(input.read_bytes(count)?)
            }
            NumericEncoding::Gcd => {
                let packed_version = packed_version(entry, input)?;
                let min = input.read_i64()?;
                let mult = input.read_i64()?;
                let block_size = input.read_vint()?;
                let quotients = BlockPackedReader::read(input, packed_version, block_size, count)?;
                NumericDocValues::Gcd {
                    min,
                    mult,
                    quotients,
                }
            }
        };
        Ok(values)
    }

    /// Returns the value of document `doc`.
    ///
    /// # Panics
    ///
    /// Panics if `doc` is not below the segment's document count.
    #[inline]
    pub fn get(&self, doc: u32) -> i64 {
        let doc = doc as usize;
        match self {
            NumericDocValues::Table { table, ords } => table[ords.get(doc) as usize],
            NumericDocValues::Delta(values) => values.get(doc),
            NumericDocValues::Uncompressed(bytes) => bytes[doc] as i8 as i64,
            NumericDocValues::Gcd {
                min,
                mult,
                quotients,
            } => min.wrapping_add(mult.wrapping_mul(quotients.get(doc))),
        }
    }

    pub fn encoding(&self) -> NumericEncoding {
        match self {
            NumericDocValues::Table { .. } => NumericEncoding::Table,
            NumericDocValues::Delta(_) => NumericEncoding::Delta,
            NumericDocValues::Uncompressed(_) => NumericEncoding::Uncompressed,
            NumericDocValues::Gcd { .. } => NumericEncoding::Gcd,
        }
    }

    /// Approximate heap footprint of the decoded column.
    pub fn ram_bytes_used(&self) -> usize {
        std::mem::size_of::<Self>()
            + match self {
                NumericDocValues::Table { table, ords } => {
                    std::mem::size_of_val(table.as_ref()) + ords.ram_bytes_used()
                }
                NumericDocValues::Delta(values) => values.ram_bytes_used(),
                NumericDocValues::Uncompressed(bytes) => bytes.len(),
                NumericDocValues::Gcd { quotients, .. } => quotients.ram_bytes_used(),
            }
    }
}

fn packed_version(entry: &NumericEntry, input: &DataInput) -> Result<i32> {
    entry
        .packed_version
        .ok_or_else(|| Error::corruption(input.name(), "packed column without packed version"))
}
