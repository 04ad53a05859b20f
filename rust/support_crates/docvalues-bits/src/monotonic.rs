//! Monotonic block-packed arrays, used for address tables.
//!
//! Every block approximates its values with a line `min + idx * average` and stores
//! the zig-zag encoded residuals:
//! * min:`zlong`
//! * average:`f32`
//! * bits_per_value:`vint`
//! * residuals: packed array of `min(block_size, remaining)` values,
//!   only when `bits_per_value > 0`

use docvalues_common::{Result, error::Error};
use docvalues_io::{DataInput, DataOutput, data_input::zigzag_decode, data_input::zigzag_encode};

use crate::{
    check_block_size, num_blocks,
    packed::{self, PackedReader, unsigned_bits_required},
};

#[derive(Debug, Clone)]
pub struct MonotonicBlockPackedReader {
    block_shift: u32,
    block_mask: usize,
    len: usize,
    mins: Vec<i64>,
    averages: Vec<f32>,
    blocks: Vec<PackedReader>,
}

impl MonotonicBlockPackedReader {
    pub fn read(
        input: &mut DataInput,
        packed_version: i32,
        block_size: i32,
        count: usize,
    ) -> Result<MonotonicBlockPackedReader> {
        packed::check_version(packed_version)?;
        let block_shift = check_block_size(block_size)?;
        let block_size = 1usize << block_shift;
        let block_count = num_blocks(count, block_shift);
        let mut mins = Vec::with_capacity(block_count);
        let mut averages = Vec::with_capacity(block_count);
        let mut blocks = Vec::with_capacity(block_count);
        for i in 0..block_count {
            mins.push(input.read_zlong()?);
            averages.push(input.read_f32()?);
            let bits_per_value = input.read_vint()?;
            if !(0..=64).contains(&bits_per_value) {
                return Err(Error::corruption(
                    input.name(),
                    format!("block {i}: invalid bits per value {bits_per_value}"),
                ));
            }
            let values_in_block = block_size.min(count - i * block_size);
            let block = if bits_per_value == 0 {
                PackedReader::from_bytes(&[], values_in_block, 0)
            } else {
                PackedReader::read(input, packed_version, values_in_block, bits_per_value as u32)?
            };
            blocks.push(block);
        }
        Ok(MonotonicBlockPackedReader {
            block_shift,
            block_mask: block_size - 1,
            len: count,
            mins,
            averages,
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
        self.mins[block]
            .wrapping_add(expected(idx, self.averages[block]))
            .wrapping_add(zigzag_decode(self.blocks[block].get(idx)))
    }

    pub fn ram_bytes_used(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.mins.capacity() * std::mem::size_of::<i64>()
            + self.averages.capacity() * std::mem::size_of::<f32>()
            + self.blocks.iter().map(PackedReader::ram_bytes_used).sum::<usize>()
    }
}

#[inline]
fn expected(idx: usize, average: f32) -> i64 {
    (idx as f32 * average) as i64
}

/// Appends `values` in monotonic block-packed layout. The values are expected to be
/// non-decreasing, though any sequence round-trips.
pub fn encode(out: &mut Vec<u8>, packed_version: i32, block_size: usize, values: &[i64]) {
    assert!(check_block_size(block_size as i32).is_ok(), "block size {block_size}");
    for block in values.chunks(block_size) {
        let min = block[0];
        let average = if block.len() == 1 {
            0f32
        } else {
            (block[block.len() - 1].wrapping_sub(min)) as f32 / (block.len() - 1) as f32
        };
        let residuals: Vec<u64> = block
            .iter()
            .enumerate()
            .map(|(i, &v)| zigzag_encode(v.wrapping_sub(min).wrapping_sub(expected(i, average))))
            .collect();
        let max = residuals.iter().copied().max().unwrap_or(0);
        let bits_per_value = unsigned_bits_required(max);
        out.write_zlong(min);
        out.write_f32(average);
        out.write_vint(bits_per_value as i32);
        if bits_per_value > 0 {
            packed::encode(out, packed_version, &residuals, bits_per_value);
        }
    }
}
