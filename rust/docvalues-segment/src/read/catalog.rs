//! Metadata catalog: per-field entries describing where and how each column is
//! stored in the data stream.

use ahash::AHashMap;
use docvalues_common::{Result, error::Error, verify_data};
use docvalues_format::defs::{
    END_OF_CATALOG, NO_MISSING_BITSET, VERSION_GCD_COMPRESSION, entry_type, numeric_encoding,
};
use docvalues_io::DataInput;

use super::field::FieldInfos;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericEncoding {
    Delta,
    Table,
    Uncompressed,
    Gcd,
}

impl NumericEncoding {
    fn from_tag(tag: u8, version: i32) -> Option<NumericEncoding> {
        match tag {
            numeric_encoding::DELTA => Some(NumericEncoding::Delta),
            numeric_encoding::TABLE => Some(NumericEncoding::Table),
            numeric_encoding::UNCOMPRESSED => Some(NumericEncoding::Uncompressed),
            numeric_encoding::GCD if version >= VERSION_GCD_COMPRESSION => {
                Some(NumericEncoding::Gcd)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericEntry {
    pub offset: u64,
    /// Position of the missing-value bitset, `None` when every document has a value.
    pub missing_offset: Option<u64>,
    /// Length of the missing-value bitset; the encoded values start right after it.
    pub missing_bytes: u64,
    pub encoding: NumericEncoding,
    /// Packed-ints version; absent for uncompressed columns.
    pub packed_version: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryEntry {
    pub offset: u64,
    pub num_bytes: u64,
    pub missing_offset: Option<u64>,
    pub missing_bytes: u64,
    pub min_length: u32,
    pub max_length: u32,
    /// Address table parameters, present only for variable-width columns.
    pub addressing: Option<Addressing>,
}

impl BinaryEntry {
    pub fn is_fixed_width(&self) -> bool {
        self.min_length == self.max_length
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Addressing {
    pub packed_version: i32,
    pub block_size: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    pub offset: u64,
    pub ord_count: u64,
}

/// All catalog entries of a segment, keyed by field number.
///
/// A sorted field carries a numeric entry (its ordinals) and a dictionary entry;
/// a sorted-set field carries a binary entry (its ordinal lists) and a dictionary
/// entry.
#[derive(Debug, Default)]
pub struct Catalog {
    pub numerics: AHashMap<u32, NumericEntry>,
    pub binaries: AHashMap<u32, BinaryEntry>,
    pub dictionaries: AHashMap<u32, DictionaryEntry>,
}

impl Catalog {
    /// Parses catalog entries from `input` up to and including the end marker.
    ///
    /// Every field number must be known to `field_infos`, and a field may carry at
    /// most one entry of each kind.
    pub fn read(input: &mut DataInput, field_infos: &FieldInfos, version: i32) -> Result<Catalog> {
        let mut catalog = Catalog::default();
        loop {
            let field_number = input.read_vint()?;
            if field_number == END_OF_CATALOG {
                break;
            }
            let number = u32::try_from(field_number)
                .ok()
                .filter(|&n| field_infos.by_number(n).is_some())
                .ok_or_else(|| {
                    Error::corruption(input.name(), format!("invalid field number {field_number}"))
                })?;
            let tag = input.read_u8()?;
            let duplicate = match tag {
                entry_type::NUMBER => {
                    let entry = read_numeric_entry(input, version)?;
                    catalog.numerics.insert(number, entry).is_some()
                }
                entry_type::BYTES => {
                    let entry = read_binary_entry(input)?;
                    catalog.binaries.insert(number, entry).is_some()
                }
                entry_type::DICTIONARY => {
                    let entry = read_dictionary_entry(input)?;
                    catalog.dictionaries.insert(number, entry).is_some()
                }
                _ => {
                    return Err(Error::corruption(
                        input.name(),
                        format!("invalid entry type {tag} for field {number}"),
                    ));
                }
            };
            if duplicate {
                return Err(Error::corruption(
                    input.name(),
                    format!("duplicate entry of type {tag} for field {number}"),
                ));
            }
        }
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.numerics.len() + self.binaries.len() + self.dictionaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn read_numeric_entry(input: &mut DataInput, version: i32) -> Result<NumericEntry> {
    let offset = read_offset(input)?;
    let (missing_offset, missing_bytes) = read_missing(input)?;
    let tag = input.read_u8()?;
    let encoding = NumericEncoding::from_tag(tag, version).ok_or_else(|| {
        Error::corruption(
            input.name(),
            format!("unknown numeric encoding {tag} for version {version}"),
        )
    })?;
    let packed_version = if encoding == NumericEncoding::Uncompressed {
        None
    } else {
        let packed_version = input.read_vint()?;
        docvalues_bits::packed::check_version(packed_version)?;
        Some(packed_version)
    };
    Ok(NumericEntry {
        offset,
        missing_offset,
        missing_bytes,
        encoding,
        packed_version,
    })
}

fn read_binary_entry(input: &mut DataInput) -> Result<BinaryEntry> {
    let offset = read_offset(input)?;
    let num_bytes = read_offset(input)?;
    let (missing_offset, missing_bytes) = read_missing(input)?;
    let min_length = input.read_vint()?;
    let max_length = input.read_vint()?;
    verify_data!(min_length, min_length >= 0);
    verify_data!(max_length, max_length >= min_length);
    let addressing = if min_length == max_length {
        None
    } else {
        let packed_version = input.read_vint()?;
        docvalues_bits::packed::check_version(packed_version)?;
        let block_size = input.read_vint()?;
        docvalues_bits::check_block_size(block_size)?;
        Some(Addressing {
            packed_version,
            block_size,
        })
    };
    Ok(BinaryEntry {
        offset,
        num_bytes,
        missing_offset,
        missing_bytes,
        min_length: min_length as u32,
        max_length: max_length as u32,
        addressing,
    })
}

fn read_dictionary_entry(input: &mut DataInput) -> Result<DictionaryEntry> {
    let offset = read_offset(input)?;
    let ord_count = input.read_vlong()?;
    verify_data!(ord_count, ord_count >= 0);
    Ok(DictionaryEntry {
        offset,
        ord_count: ord_count as u64,
    })
}

fn read_offset(input: &mut DataInput) -> Result<u64> {
    let offset = input.read_i64()?;
    verify_data!(offset, offset >= 0);
    Ok(offset as u64)
}

fn read_missing(input: &mut DataInput) -> Result<(Option<u64>, u64)> {
    let missing_offset = input.read_i64()?;
    if missing_offset == NO_MISSING_BITSET {
        return Ok((None, 0));
    }
    verify_data!(missing_offset, missing_offset >= 0);
    let missing_bytes = input.read_i64()?;
    verify_data!(missing_bytes, missing_bytes >= 0 && missing_bytes % 8 == 0);
    Ok((Some(missing_offset as u64), missing_bytes as u64))
}
