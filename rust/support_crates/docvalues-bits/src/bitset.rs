use docvalues_common::{Result, error::Error};
use docvalues_io::DataInput;

/// Random-access read-only view over a set of document indices.
pub trait Bits: Send + Sync {
    /// Returns `true` if bit `index` is set.
    ///
    /// Indices outside `[0, len())` are unspecified and may panic.
    fn get(&self, index: usize) -> bool;

    /// Number of addressable bits.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ram_bytes_used(&self) -> usize {
        0
    }
}

/// All bits set.
#[derive(Debug, Clone, Copy)]
pub struct MatchAllBits {
    len: usize,
}

impl MatchAllBits {
    pub fn new(len: usize) -> MatchAllBits {
        MatchAllBits { len }
    }
}

impl Bits for MatchAllBits {
    fn get(&self, _index: usize) -> bool {
        true
    }

    fn len(&self) -> usize {
        self.len
    }
}

/// No bits set.
#[derive(Debug, Clone, Copy)]
pub struct MatchNoBits {
    len: usize,
}

impl MatchNoBits {
    pub fn new(len: usize) -> MatchNoBits {
        MatchNoBits { len }
    }
}

impl Bits for MatchNoBits {
    fn get(&self, _index: usize) -> bool {
        false
    }

    fn len(&self) -> usize {
        self.len
    }
}

/// A fixed-length bit set backed by `u64` words; bit `i` lives in word `i / 64` at
/// position `i % 64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedBitSet {
    words: Vec<u64>,
    len: usize,
}

impl FixedBitSet {
    /// Creates an empty set of `len` bits.
    pub fn new(len: usize) -> FixedBitSet {
        FixedBitSet {
            words: vec![0; Self::words_for(len)],
            len,
        }
    }

    /// Wraps existing words. Bits at or beyond `len` are ignored.
    pub fn from_words(words: Vec<u64>, len: usize) -> Result<FixedBitSet> {
        if words.len() < Self::words_for(len) {
            return Err(Error::corruption(
                "bitset",
                format!("{} words cannot hold {len} bits", words.len()),
            ));
        }
        Ok(FixedBitSet { words, len })
    }

    /// Reads `num_bytes` (a multiple of 8) of little-endian words from `input`.
    pub fn read(input: &mut DataInput, num_bytes: u64, len: usize) -> Result<FixedBitSet> {
        if num_bytes % 8 != 0 {
            return Err(Error::corruption(
                input.name(),
                format!("bitset length {num_bytes} is not a multiple of 8"),
            ));
        }
        if num_bytes > input.remaining() {
            return Err(Error::corruption(
                input.name(),
                format!("bitset of {num_bytes} bytes runs past the end of the stream"),
            ));
        }
        let words = (0..num_bytes / 8)
            .map(|_| input.read_u64())
            .collect::<Result<Vec<u64>>>()?;
        Self::from_words(words, len)
    }

    pub fn words_for(len: usize) -> usize {
        len.div_ceil(64)
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }

    pub fn set(&mut self, index: usize) {
        assert!(index < self.len, "index {index} out of bounds ({})", self.len);
        self.words[index >> 6] |= 1u64 << (index & 63);
    }

    pub fn clear(&mut self, index: usize) {
        assert!(index < self.len, "index {index} out of bounds ({})", self.len);
        self.words[index >> 6] &= !(1u64 << (index & 63));
    }

    /// Number of set bits within `[0, len)`.
    pub fn cardinality(&self) -> usize {
        let full = self.len >> 6;
        let mut count: usize = self.words[..full]
            .iter()
            .map(|w| w.count_ones() as usize)
            .sum();
        let rem = self.len & 63;
        if rem != 0 {
            count += (self.words[full] & ((1u64 << rem) - 1)).count_ones() as usize;
        }
        count
    }
}

impl Bits for FixedBitSet {
    #[inline]
    fn get(&self, index: usize) -> bool {
        debug_assert!(index < self.len, "index {index} out of bounds ({})", self.len);
        (self.words[index >> 6] >> (index & 63)) & 1 != 0
    }

    fn len(&self) -> usize {
        self.len
    }

    fn ram_bytes_used(&self) -> usize {
        std::mem::size_of::<Self>() + self.words.capacity() * std::mem::size_of::<u64>()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_set_get() {
        let mut bits = FixedBitSet::new(130);
        bits.set(0);
        bits.set(63);
        bits.set(64);
        bits.set(129);
        assert!(bits.get(0) && bits.get(63) && bits.get(64) && bits.get(129));
        assert!(!bits.get(1) && !bits.get(128));
        assert_eq!(bits.cardinality(), 4);
        bits.clear(63);
        assert!(!bits.get(63));
        assert_eq!(bits.words().len(), 3);
    }

    #[test]
    fn test_read_words() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0b1010u64.to_le_bytes());
        buf.extend_from_slice(&(1u64 << 63).to_le_bytes());
        let mut input = DataInput::new(Arc::new(buf), "bits").unwrap();
        let bits = FixedBitSet::read(&mut input, 16, 128).unwrap();
        assert!(!bits.get(0));
        assert!(bits.get(1));
        assert!(bits.get(3));
        assert!(bits.get(127));
        assert_eq!(bits.cardinality(), 3);
    }

    #[test]
    fn test_read_rejects_partial_words() {
        let mut input = DataInput::new(Arc::new(vec![0u8; 12]), "bits").unwrap();
        assert!(FixedBitSet::read(&mut input, 12, 64).unwrap_err().is_corruption());

        let mut input = DataInput::new(Arc::new(vec![0u8; 8]), "bits").unwrap();
        assert!(FixedBitSet::read(&mut input, 8, 65).unwrap_err().is_corruption());
    }

    #[test]
    fn test_read_past_end() {
        let mut input = DataInput::new(Arc::new(vec![0u8; 16]), "bits").unwrap();
        input.seek(8).unwrap();
        assert!(FixedBitSet::read(&mut input, 16, 64).unwrap_err().is_corruption());
        assert!(FixedBitSet::read(&mut input, 8, 64).is_ok());
    }

    #[test]
    fn test_cardinality_ignores_tail() {
        let bits = FixedBitSet::from_words(vec![u64::MAX], 10).unwrap();
        assert_eq!(bits.cardinality(), 10);
    }

    #[test]
    fn test_constant_bits() {
        let all = MatchAllBits::new(3);
        let none = MatchNoBits::new(3);
        assert!((0..3).all(|i| all.get(i)));
        assert!((0..3).all(|i| !none.get(i)));
        assert_eq!(all.len(), 3);
        assert!(MatchNoBits::new(0).is_empty());
    }
}
