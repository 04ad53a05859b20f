/// Leading magic of every segment stream, little-endian `u32`.
pub const CODEC_MAGIC: u32 = 0x3fd7_6c17;

/// Leading magic of the checksum footer: the bitwise complement of [`CODEC_MAGIC`].
pub const FOOTER_MAGIC: u32 = !CODEC_MAGIC;

/// Footer checksum algorithm identifier: xxh3, 64-bit.
pub const CHECKSUM_ALGORITHM_XXH3: u32 = 0;

/// Checksum footer size:
/// * magic:`u32`
/// * algorithm:`u32`
/// * checksum:`u64`
pub const FOOTER_SIZE: usize = 16;

/// Size of the checksum value that closes the footer.
pub const CHECKSUM_SIZE: usize = 8;

/// Codec name written into the header of the metadata stream.
pub const METADATA_CODEC: &str = "DocValuesMetadata";

/// Codec name written into the header of the data stream.
pub const DATA_CODEC: &str = "DocValuesData";

/// Default file extension of the metadata stream.
pub const METADATA_EXTENSION: &str = "dvm";

/// Default file extension of the data stream.
pub const DATA_EXTENSION: &str = "dvd";

pub const VERSION_START: i32 = 0;
/// First version allowed to carry GCD-compressed numeric columns.
pub const VERSION_GCD_COMPRESSION: i32 = 1;
/// First version closing both streams with a checksum footer.
pub const VERSION_CHECKSUM: i32 = 2;
pub const VERSION_CURRENT: i32 = VERSION_CHECKSUM;

/// Catalog entry type tags, following the field number in the metadata stream.
pub mod entry_type {
    pub const NUMBER: u8 = 0;
    pub const BYTES: u8 = 1;
    pub const DICTIONARY: u8 = 2;
}

/// Numeric column encoding tags.
pub mod numeric_encoding {
    pub const DELTA: u8 = 0;
    pub const TABLE: u8 = 1;
    pub const UNCOMPRESSED: u8 = 2;
    pub const GCD: u8 = 3;
}

/// Field number that terminates the metadata catalog.
pub const END_OF_CATALOG: i32 = -1;

/// Offset value meaning "no missing-value bitset": every document has a value.
pub const NO_MISSING_BITSET: i64 = -1;

/// Largest number of distinct values a table-compressed numeric column may hold.
pub const MAX_TABLE_SIZE: usize = 256;

/// Returns the name of a segment stream: `{segment}[_{suffix}].{extension}`.
pub fn segment_stream_name(segment: &str, suffix: &str, extension: &str) -> String {
    let mut name = String::with_capacity(segment.len() + suffix.len() + extension.len() + 2);
    name.push_str(segment);
    if !suffix.is_empty() {
        name.push('_');
        name.push_str(suffix);
    }
    if !extension.is_empty() {
        name.push('.');
        name.push_str(extension);
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_stream_name() {
        assert_eq!(segment_stream_name("_0", "", "dvd"), "_0.dvd");
        assert_eq!(segment_stream_name("_0", "Memory_0", "dvm"), "_0_Memory_0.dvm");
        assert_eq!(segment_stream_name("_3", "", ""), "_3");
    }

    #[test]
    fn test_magic() {
        assert_eq!(FOOTER_MAGIC, 0xc028_93e8);
    }
}
