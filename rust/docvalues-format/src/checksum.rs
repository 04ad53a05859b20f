use std::ops::Range;

use docvalues_common::{Result, error::Error};
use docvalues_io::ReadAt;
use xxhash_rust::xxh3::Xxh3;

/// Computes a checksum for a given buffer using the xxHash algorithm.
pub fn compute(buf: &[u8]) -> u64 {
    xxhash_rust::xxh3::xxh3_64(buf)
}

/// Computes the checksum of a byte range of a positional source, reading it in
/// chunks sized according to the source's storage profile.
///
/// The result is identical to [`compute`] over the same bytes.
pub fn compute_range(source: &dyn ReadAt, range: Range<u64>, name: &str) -> Result<u64> {
    let chunk = source.storage_profile().clamp_io_size(1024 * 1024) as u64;
    let mut hasher = Xxh3::new();
    let mut pos = range.start;
    while pos < range.end {
        let end = std::cmp::min(range.end, pos + chunk);
        let bytes = source
            .read_at(pos..end)
            .map_err(|e| Error::io(name.to_string(), e))?;
        if bytes.is_empty() {
            return Err(Error::corruption(
                name,
                format!("unexpected end of stream at {pos} while checksumming"),
            ));
        }
        hasher.update(&bytes);
        pos += bytes.len() as u64;
    }
    Ok(hasher.digest())
}

/// Validates a buffer by comparing its computed checksum with the provided checksum.
///
/// # Errors
///
/// Returns `ChecksumMismatch` if the computed checksum does not match.
pub fn validate_buffer(buf: &[u8], checksum: u64, name: Option<&str>) -> Result<()> {
    validate(compute(buf), checksum, name)
}

pub fn validate(actual: u64, expected: u64, name: Option<&str>) -> Result<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(Error::checksum_mismatch(name.unwrap_or_default()))
    }
}
