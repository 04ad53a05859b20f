//! Packed-integer arrays and bit sets used by the doc-values read path.
//!
//! - [`packed`]: fixed bit-width arrays, LSB-first.
//! - [`block_packed`]: blocks of values stored as a per-block minimum plus narrow deltas.
//! - [`monotonic`]: blocks of non-decreasing values stored as a per-block line
//!   (minimum and average slope) plus zig-zag residuals.
//! - [`bitset`]: per-document presence sets.
//!
//! Each array type has a reader that eagerly decodes its persisted layout from a
//! [`DataInput`](docvalues_io::DataInput) and an `encode` function producing that
//! same layout, used for building fixtures.

pub mod bitset;
pub mod block_packed;
pub mod monotonic;
pub mod packed;

pub use bitset::{Bits, FixedBitSet, MatchAllBits, MatchNoBits};
pub use block_packed::BlockPackedReader;
pub use monotonic::MonotonicBlockPackedReader;
pub use packed::PackedReader;

/// Smallest supported block size of the blocked encodings.
pub const MIN_BLOCK_SIZE: u32 = 64;

/// Largest supported block size of the blocked encodings.
pub const MAX_BLOCK_SIZE: u32 = 1 << 27;

/// Validates a block size read from a stream and returns its base-2 logarithm.
pub fn check_block_size(block_size: i32) -> docvalues_common::Result<u32> {
    if block_size < MIN_BLOCK_SIZE as i32
        || block_size > MAX_BLOCK_SIZE as i32
        || !(block_size as u32).is_power_of_two()
    {
        return Err(docvalues_common::error::Error::corruption(
            "block_size",
            format!(
                "block size must be a power of two in [{MIN_BLOCK_SIZE}, {MAX_BLOCK_SIZE}], got {block_size}"
            ),
        ));
    }
    Ok((block_size as u32).trailing_zeros())
}

/// Number of blocks needed for `value_count` values.
pub(crate) fn num_blocks(value_count: usize, block_shift: u32) -> usize {
    let block_size = 1usize << block_shift;
    value_count.div_ceil(block_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_block_size() {
        assert_eq!(check_block_size(64).unwrap(), 6);
        assert_eq!(check_block_size(1 << 14).unwrap(), 14);
        assert!(check_block_size(32).unwrap_err().is_corruption());
        assert!(check_block_size(100).unwrap_err().is_corruption());
        assert!(check_block_size(1 << 28).unwrap_err().is_corruption());
        assert!(check_block_size(-64).unwrap_err().is_corruption());
    }

    #[test]
    fn test_num_blocks() {
        assert_eq!(num_blocks(0, 6), 0);
        assert_eq!(num_blocks(64, 6), 1);
        assert_eq!(num_blocks(65, 6), 2);
    }
}
