//! Ordered term dictionary of sorted and sorted-set fields.
//!
//! Terms are stored as an FST map from the term bytes to a dense ordinal, with
//! ordinals assigned in ascending byte order. Because the FST pushes outputs
//! towards the root, the output accumulated along any path equals the smallest
//! ordinal reachable below it, which is what makes ordinal-to-term traversal
//! possible without a separate index.

use std::sync::Arc;

use bytes::Bytes;
use docvalues_common::{Result, error::Error};
use docvalues_io::DataInput;
use fst::{IntoStreamer, Map, Streamer, raw::Fst};

use super::{catalog::DictionaryEntry, terms_enum::TermsEnum};

pub struct Dictionary {
    map: Map<Bytes>,
    ord_count: u64,
}

impl Dictionary {
    /// Loads the dictionary described by `entry`.
    ///
    /// Must not be called for an empty dictionary: those are represented by the
    /// empty sorted views and nothing is read for them.
    pub fn load(input: &mut DataInput, entry: &DictionaryEntry) -> Result<Dictionary> {
        input.seek(entry.offset)?;
        let len = input.read_vlong()?;
        if len < 0 || len as u64 > input.remaining() {
            return Err(Error::corruption(
                input.name(),
                format!("invalid dictionary length {len}"),
            ));
        }
        let bytes = input.read_bytes(len as usize)?;
        let map = Map::new(bytes)
            .map_err(|e| Error::corruption(input.name(), format!("invalid dictionary: {e}")))?;
        if map.len() as u64 != entry.ord_count {
            return Err(Error::corruption(
                input.name(),
                format!(
                    "dictionary holds {} terms, catalog declares {}",
                    map.len(),
                    entry.ord_count
                ),
            ));
        }
        Ok(Dictionary {
            map,
            ord_count: entry.ord_count,
        })
    }

    /// Number of terms; ordinals are `0..ord_count`.
    pub fn ord_count(&self) -> u64 {
        self.ord_count
    }

    /// Returns the ordinal of `term`, or `-(insertion_point) - 1` if absent.
    pub fn lookup_term(&self, term: &[u8]) -> i64 {
        if let Some(ord) = self.map.get(term) {
            return ord as i64;
        }
        let mut ceil = self.map.range().gt(term).into_stream();
        let insertion = match ceil.next() {
            Some((_, ord)) => ord as i64,
            None => self.ord_count as i64,
        };
        -insertion - 1
    }

    /// Returns a fresh, unpositioned cursor over the terms.
    pub fn terms_enum(self: &Arc<Self>) -> TermsEnum {
        TermsEnum::new(Arc::clone(self))
    }

    pub(crate) fn fst(&self) -> &Fst<Bytes> {
        self.map.as_fst()
    }

    pub fn ram_bytes_used(&self) -> usize {
        std::mem::size_of::<Self>() + self.map.as_fst().size()
    }
}

impl std::fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dictionary")
            .field("ord_count", &self.ord_count)
            .field("fst_bytes", &self.map.as_fst().size())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use docvalues_io::{DataInput, DataOutput};
    use fst::MapBuilder;

    use super::*;

    /// Encodes `terms` (sorted, distinct) as a dictionary region at offset `pad`.
    pub(crate) fn encode(terms: &[&[u8]], pad: usize) -> (Vec<u8>, DictionaryEntry) {
        let mut builder = MapBuilder::memory();
        for (ord, term) in terms.iter().enumerate() {
            builder.insert(term, ord as u64).unwrap();
        }
        let fst = builder.into_inner().unwrap();
        let mut buf: Vec<u8> = vec![0; pad];
        buf.write_vlong(fst.len() as i64);
        buf.extend_from_slice(&fst);
        let entry = DictionaryEntry {
            offset: pad as u64,
            ord_count: terms.len() as u64,
        };
        (buf, entry)
    }

    pub(crate) fn dictionary(terms: &[&[u8]]) -> Arc<Dictionary> {
        let (buf, entry) = encode(terms, 3);
        let mut input = DataInput::new(Arc::new(Bytes::from(buf)), "dict").unwrap();
        Arc::new(Dictionary::load(&mut input, &entry).unwrap())
    }

    #[test]
    fn test_lookup_term() {
        let dict = dictionary(&[b"apple", b"banana", b"cherry"]);
        assert_eq!(dict.ord_count(), 3);
        assert_eq!(dict.lookup_term(b"apple"), 0);
        assert_eq!(dict.lookup_term(b"cherry"), 2);
        assert_eq!(dict.lookup_term(b"blueberry"), -3);
        assert_eq!(dict.lookup_term(b"a"), -1);
        assert_eq!(dict.lookup_term(b""), -1);
        assert_eq!(dict.lookup_term(b"zucchini"), -4);
        assert_eq!(dict.lookup_term(b"bananas"), -3);
    }

    #[test]
    fn test_ord_count_mismatch() {
        let (buf, mut entry) = encode(&[b"a", b"b"], 0);
        entry.ord_count = 3;
        let mut input = DataInput::new(Arc::new(buf), "dict").unwrap();
        assert!(
            Dictionary::load(&mut input, &entry)
                .unwrap_err()
                .is_corruption()
        );
    }

    #[test]
    fn test_garbage_fst() {
        let mut buf: Vec<u8> = Vec::new();
        buf.write_vlong(6);
        buf.extend_from_slice(b"abcdef");
        let entry = DictionaryEntry {
            offset: 0,
            ord_count: 1,
        };
        let mut input = DataInput::new(Arc::new(buf), "dict").unwrap();
        assert!(
            Dictionary::load(&mut input, &entry)
                .unwrap_err()
                .is_corruption()
        );
    }

    #[test]
    fn test_length_past_end() {
        let mut buf: Vec<u8> = Vec::new();
        buf.write_vlong(1000);
        buf.extend_from_slice(&[0; 10]);
        let entry = DictionaryEntry {
            offset: 0,
            ord_count: 1,
        };
        let mut input = DataInput::new(Arc::new(buf), "dict").unwrap();
        assert!(
            Dictionary::load(&mut input, &entry)
                .unwrap_err()
                .is_corruption()
        );
    }
}
