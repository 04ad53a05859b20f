//! Fixed bit-width packed arrays.
//!
//! Value `i` occupies bits `[i * bpv, (i + 1) * bpv)` of a little-endian bit stream
//! (LSB-first within each byte). Two packed versions differ only in how many bytes
//! the stream occupies:
//!
//! | Version | Byte count |
//! |---|---|
//! | `0` | `ceil(count * bpv / 64) * 8` (long-aligned) |
//! | `1` | `ceil(count * bpv / 8)` (byte-aligned) |

use docvalues_common::{Result, error::Error};
use docvalues_io::{DataInput, DataOutput};

/// Long-aligned packed layout.
pub const VERSION_START: i32 = 0;
/// Byte-aligned packed layout.
pub const VERSION_BYTE_ALIGNED: i32 = 1;
pub const VERSION_CURRENT: i32 = VERSION_BYTE_ALIGNED;

/// Fails with corruption unless `version` is a supported packed version.
pub fn check_version(version: i32) -> Result<()> {
    if (VERSION_START..=VERSION_CURRENT).contains(&version) {
        Ok(())
    } else {
        Err(Error::corruption(
            "packed_version",
            format!("unsupported packed ints version {version}, expected [{VERSION_START}, {VERSION_CURRENT}]"),
        ))
    }
}

/// Number of bytes occupied by `count` values of `bits_per_value` bits.
pub fn byte_count(version: i32, count: usize, bits_per_value: u32) -> u64 {
    let bits = count as u64 * bits_per_value as u64;
    if version == VERSION_START {
        bits.div_ceil(64) * 8
    } else {
        bits.div_ceil(8)
    }
}

/// Bits needed to represent the unsigned value `max`; at least 1.
pub fn bits_required(max: u64) -> u32 {
    (64 - max.leading_zeros()).max(1)
}

/// Bits needed to represent the unsigned value `max`; 0 for 0.
pub fn unsigned_bits_required(max: u64) -> u32 {
    64 - max.leading_zeros()
}

/// Mask selecting the low `bits_per_value` bits.
#[inline]
pub fn mask(bits_per_value: u32) -> u64 {
    if bits_per_value >= 64 {
        u64::MAX
    } else {
        (1u64 << bits_per_value) - 1
    }
}

/// A decoded, immutable fixed-width packed array.
///
/// `bits_per_value == 0` is a valid degenerate array where every value is zero.
#[derive(Debug, Clone)]
pub struct PackedReader {
    words: Vec<u64>,
    len: usize,
    bits_per_value: u32,
}

impl PackedReader {
    /// Reads `count` values of `bits_per_value` bits, stored with the given packed
    /// version, at the current position of `input`. The cursor is left right after
    /// the packed stream.
    pub fn read(
        input: &mut DataInput,
        version: i32,
        count: usize,
        bits_per_value: u32,
    ) -> Result<PackedReader> {
        check_version(version)?;
        if bits_per_value > 64 {
            return Err(Error::corruption(
                input.name(),
                format!("invalid bits per value {bits_per_value}"),
            ));
        }
        let len = byte_count(version, count, bits_per_value);
        let bytes = input.read_bytes(len as usize)?;
        Ok(Self::from_bytes(&bytes, count, bits_per_value))
    }

    /// Decodes a packed stream already in memory. Missing trailing bytes read as zero.
    pub fn from_bytes(bytes: &[u8], count: usize, bits_per_value: u32) -> PackedReader {
        let needed_words = (count as u64 * bits_per_value as u64).div_ceil(64) as usize;
        let mut words = Vec::with_capacity(needed_words);
        for chunk in bytes.chunks(8).take(needed_words) {
            let mut word = [0u8; 8];
            word[..chunk.len()].copy_from_slice(chunk);
            words.push(u64::from_le_bytes(word));
        }
        words.resize(needed_words, 0);
        PackedReader {
            words,
            len: count,
            bits_per_value,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bits_per_value(&self) -> u32 {
        self.bits_per_value
    }

    /// Returns the value at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    pub fn get(&self, index: usize) -> u64 {
        assert!(index < self.len, "index {index} out of bounds ({})", self.len);
        let bpv = self.bits_per_value;
        if bpv == 0 {
            return 0;
        }
        let bit = index as u64 * bpv as u64;
        let word = (bit >> 6) as usize;
        let shift = (bit & 63) as u32;
        let mut value = self.words[word] >> shift;
        if shift + bpv > 64 {
            value |= self.words[word + 1] << (64 - shift);
        }
        value & mask(bpv)
    }

    pub fn ram_bytes_used(&self) -> usize {
        std::mem::size_of::<Self>() + self.words.capacity() * std::mem::size_of::<u64>()
    }
}

/// Appends `values` as a packed stream of the given version.
///
/// # Panics
///
/// Panics if a value does not fit in `bits_per_value` bits.
pub fn encode(out: &mut Vec<u8>, version: i32, values: &[u64], bits_per_value: u32) {
    let len = byte_count(version, values.len(), bits_per_value) as usize;
    let mut words = vec![0u64; len.div_ceil(8)];
    for (i, &value) in values.iter().enumerate() {
        assert!(
            value & !mask(bits_per_value) == 0 || bits_per_value >= 64,
            "value {value} does not fit in {bits_per_value} bits"
        );
        if bits_per_value == 0 {
            continue;
        }
        let bit = i as u64 * bits_per_value as u64;
        let word = (bit >> 6) as usize;
        let shift = (bit & 63) as u32;
        words[word] |= value << shift;
        if shift + bits_per_value > 64 {
            words[word + 1] |= value >> (64 - shift);
        }
    }
    let mut bytes = Vec::with_capacity(words.len() * 8);
    for word in words {
        bytes.write_u64(word);
    }
    out.extend_from_slice(&bytes[..len]);
}
