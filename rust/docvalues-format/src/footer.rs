//! Checksum footer closing a segment stream:
//! * magic:`u32` ([`FOOTER_MAGIC`])
//! * algorithm:`u32` ([`CHECKSUM_ALGORITHM_XXH3`])
//! * checksum:`u64`, xxh3 over every byte of the stream preceding it

use docvalues_common::{Result, error::Error};
use docvalues_io::{DataInput, DataOutput, ReadAt};

use crate::{
    checksum,
    defs::{CHECKSUM_ALGORITHM_XXH3, CHECKSUM_SIZE, FOOTER_MAGIC, FOOTER_SIZE},
};

/// Validates the footer of a stream that has been consumed sequentially up to the
/// footer: exactly [`FOOTER_SIZE`] bytes must remain, the footer must be well formed,
/// and its checksum must match the stream contents.
pub fn check_footer(input: &mut DataInput) -> Result<()> {
    let remaining = input.remaining();
    if remaining != FOOTER_SIZE as u64 {
        return Err(Error::corruption(
            input.name(),
            format!("expected footer of {FOOTER_SIZE} bytes, {remaining} bytes remain"),
        ));
    }
    let expected = read_footer(input)?;
    let covered = input.len() - CHECKSUM_SIZE as u64;
    let actual = checksum::compute_range(input.source().as_ref(), 0..covered, input.name())?;
    checksum::validate(actual, expected, Some(input.name()))
}

/// Reads the footer at the end of the stream without checksumming, returning the
/// stored checksum. Fails when the stream is too short or the footer is malformed.
pub fn retrieve_checksum(source: &dyn ReadAt, name: &str) -> Result<u64> {
    let size = source.size().map_err(|e| Error::io(name.to_string(), e))?;
    if size < FOOTER_SIZE as u64 {
        return Err(Error::corruption(
            name,
            format!("stream of {size} bytes is too short to hold a footer"),
        ));
    }
    let bytes = source
        .read_at(size - FOOTER_SIZE as u64..size)
        .map_err(|e| Error::io(name.to_string(), e))?;
    parse_footer(&bytes, name)
}

/// Verifies the checksum stored in the footer against the whole stream.
pub fn verify_checksum(source: &dyn ReadAt, name: &str) -> Result<()> {
    let expected = retrieve_checksum(source, name)?;
    let size = source.size().map_err(|e| Error::io(name.to_string(), e))?;
    let actual = checksum::compute_range(source, 0..size - CHECKSUM_SIZE as u64, name)?;
    checksum::validate(actual, expected, Some(name))
}

/// Appends a footer to a fully written stream buffer.
pub fn write_footer(stream: &mut Vec<u8>) {
    stream.write_u32(FOOTER_MAGIC);
    stream.write_u32(CHECKSUM_ALGORITHM_XXH3);
    let checksum = checksum::compute(stream);
    stream.write_u64(checksum);
}

fn read_footer(input: &mut DataInput) -> Result<u64> {
    let mut footer = [0u8; FOOTER_SIZE];
    input.read_into(&mut footer)?;
    parse_footer(&footer, input.name())
}

fn parse_footer(footer: &[u8], name: &str) -> Result<u64> {
    if footer.len() != FOOTER_SIZE {
        return Err(Error::corruption(name, "truncated footer"));
    }
    let magic = u32::from_le_bytes([footer[0], footer[1], footer[2], footer[3]]);
    if magic != FOOTER_MAGIC {
        return Err(Error::corruption(
            name,
            format!("footer mismatch: actual magic {magic:#x}, expected {FOOTER_MAGIC:#x}"),
        ));
    }
    let algorithm = u32::from_le_bytes([footer[4], footer[5], footer[6], footer[7]]);
    if algorithm != CHECKSUM_ALGORITHM_XXH3 {
        return Err(Error::corruption(
            name,
            format!("unknown checksum algorithm {algorithm}"),
        ));
    }
    let mut checksum = [0u8; CHECKSUM_SIZE];
    checksum.copy_from_slice(&footer[8..]);
    Ok(u64::from_le_bytes(checksum))
}
