//! Block-packed arrays.
//!
//! Values are split into blocks of a power-of-two size. Every block is stored as:
//! * token:`u8` = `(bits_per_value << 1) | min_is_zero`
//! * min:`zlong`, only when `min_is_zero` is not set
//! * deltas from `min`: packed array of `min(block_size, remaining)` values,
//!   only when `bits_per_value > 0`

use docvalues_common::{Result, error::Error};
use docvalues_io::{DataInput, DataOutput};

use crate::{
    check_block_size, num_blocks,
    packed::{self, PackedReader, unsigned_bits_required},
};

const MIN_VALUE_EQUALS_0: u8 = 1;
const BPV_SHIFT: u32 = 1;

#[derive(Debug, Clone)]
pub struct BlockPackedReader {
    block_shift: u32,
    block_mask: usize,
    len: usize,
    mins: Vec<i64>,
    blocks: Vec<PackedReader>,
}

impl BlockPackedReader {
    /// Reads `count` values at the current position of `input`.
    pub fn read(
        input: &mut DataInput,
        packed_version: i32,
        block_size: i32,
        count: usize,
    ) -> Result<BlockPackedReader> {
        packed::check_version(packed_version)?;
        let block_shift = check_block_size(block_size)?;
        let block_size = 1usize << block_shift;
        let block_count = num_blocks(count, block_shift);
        let mut mins = Vec::with_capacity(block_count);
        let mut blocks = Vec::with_capacity(block_count);
        for i in 0..block_count {
            let token = input.read_u8()?;
            let bits_per_value = (token >> BPV_SHIFT) as u32;
            if bits_per_value > 64 {
                return Err(Error::corruption(
                    input.name(),
                    format!("block {i}: invalid bits per value {bits_per_value}"),
                ));
            }
            let min = if token & MIN_VALUE_EQUALS_0 == 0 {
                input.read_zlong()?
            } else {
                0
            };
            let values_in_block = block_size.min(count - i * block_size);
            let block = if bits_per_value == 0 {
                PackedReader::from_bytes(&[], values_in_block, 0)
            } else {
                PackedReader::read(input, packed_version, values_in_block, bits_per_value)?
            };
            mins.push(min);
            blocks.push(block);
        }
        Ok(BlockPackedReader {
            block_shift,
            block_mask: block_size - 1,
            len: count,
            mins,
            blocks,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the value at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    pub fn get(&self, index: usize) -> i64 {
        assert!(index < self.len, "index {index} out of bounds ({})", self.len);
        let block = index >> self.block_shift;
        let idx = index & self.block_mask;
        self.mins[block].wrapping_add(self.blocks[block].get(idx) as i64)
    }

    pub fn ram_bytes_used(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.mins.capacity() * std::mem::size_of::<i64>()
            + self.blocks.iter().map(PackedReader::ram_bytes_used).sum::<usize>()
    }
}

/// Appends `values` in block-packed layout.
///
/// # Panics
///
/// Panics if `block_size` is not a valid block size.
pub fn encode(out: &mut Vec<u8>, packed_version: i32, block_size: usize, values: &[i64]) {
    assert!(check_block_size(block_size as i32).is_ok(), "block size {block_size}");
    for block in values.chunks(block_size) {
        let min = block.iter().copied().min().unwrap_or(0);
        let max = block.iter().copied().max().unwrap_or(0);
        let delta = max.wrapping_sub(min) as u64;
        let bits_per_value = unsigned_bits_required(delta);
        let min_is_zero = if min == 0 { MIN_VALUE_EQUALS_0 } else { 0 };
        out.write_u8(((bits_per_value as u8) << BPV_SHIFT) | min_is_zero);
        if min != 0 {
            out.write_zlong(min);
        }
        if bits_per_value > 0 {
            let deltas: Vec<u64> = block.iter().map(|&v| v.wrapping_sub(min) as u64).collect();
            packed::encode(out, packed_version, &deltas, bits_per_value);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::packed::VERSION_CURRENT;

    use super::*;

    fn round_trip(values: &[i64], block_size: usize, version: i32) -> BlockPackedReader {
        let mut buf = Vec::new();
        encode(&mut buf, version, block_size, values);
        let total = buf.len() as u64;
        let mut input = DataInput::new(Arc::new(buf), "block_packed").unwrap();
        let reader =
            BlockPackedReader::read(&mut input, version, block_size as i32, values.len()).unwrap();
        assert_eq!(input.position(), total);
        reader
    }

    #[test]
    fn test_mixed_blocks() {
        let mut values: Vec<i64> = (0..64).map(|_| 42).collect();
        values.extend((0..64).map(|i| i * 3 - 100));
        values.extend((0..64).map(|i| i));
        values.extend([i64::MIN, i64::MAX, 0, -1, 1]);

        for version in [0, VERSION_CURRENT] {
            let reader = round_trip(&values, 64, version);
            assert_eq!(reader.len(), values.len());
            for (i, &v) in values.iter().enumerate() {
                assert_eq!(reader.get(i), v, "index {i}");
            }
        }
    }

    #[test]
    fn test_random_values() {
        let values: Vec<i64> = (0..5000).map(|_| fastrand::i64(-1_000_000..1_000_000)).collect();
        let reader = round_trip(&values, 1024, VERSION_CURRENT);
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(reader.get(i), v);
        }
    }

    #[test]
    fn test_empty() {
        let reader = round_trip(&[], 128, VERSION_CURRENT);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_invalid_block_size() {
        let mut input = DataInput::new(Arc::new(vec![0u8; 4]), "bad").unwrap();
        let e = BlockPackedReader::read(&mut input, VERSION_CURRENT, 100, 10).unwrap_err();
        assert!(e.is_corruption());
    }
}
