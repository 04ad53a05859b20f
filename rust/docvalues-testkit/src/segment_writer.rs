//! Writer for doc-values segment fixtures.
//!
//! Produces the metadata and data streams of one segment, field by field, in any
//! of the supported layouts and format versions. Nothing here validates the way the
//! reader does: tests rely on being able to write streams the reader must reject.

use docvalues_bits::{block_packed, monotonic, packed};
use docvalues_format::{
    defs::{
        DATA_CODEC, DATA_EXTENSION, END_OF_CATALOG, METADATA_CODEC, METADATA_EXTENSION,
        NO_MISSING_BITSET, VERSION_CHECKSUM, VERSION_CURRENT, entry_type, numeric_encoding,
        segment_stream_name,
    },
    footer, header,
};
use docvalues_io::DataOutput;
use docvalues_objectstore::MemoryObjectStore;
use fst::MapBuilder;

/// Kind of column written for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric,
    Binary,
    Sorted,
    SortedSet,
}

/// A field written by [`SegmentWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenField {
    pub name: String,
    pub number: u32,
    pub kind: FieldKind,
}

/// Encoding requested for a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericLayout {
    Delta { block_size: usize },
    Table,
    Uncompressed,
    Gcd { block_size: usize },
}

/// Stream names and sizes of a finished segment.
#[derive(Debug, Clone)]
pub struct WrittenSegment {
    pub segment_name: String,
    pub segment_suffix: String,
    pub doc_count: u32,
    pub metadata_name: String,
    pub data_name: String,
    pub metadata_len: usize,
    pub data_len: usize,
    pub fields: Vec<WrittenField>,
}

pub struct SegmentWriter {
    segment_name: String,
    segment_suffix: String,
    doc_count: u32,
    version: i32,
    packed_version: i32,
    meta: Vec<u8>,
    data: Vec<u8>,
    fields: Vec<WrittenField>,
}

impl SegmentWriter {
    /// Starts a segment with `doc_count` documents at the current format version.
    pub fn new(segment_name: &str, doc_count: u32) -> SegmentWriter {
        SegmentWriter {
            segment_name: segment_name.to_string(),
            segment_suffix: String::new(),
            doc_count,
            version: VERSION_CURRENT,
            packed_version: packed::VERSION_CURRENT,
            meta: Vec::new(),
            data: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.segment_suffix = suffix.to_string();
        self
    }

    /// Format version stamped into both stream headers.
    pub fn with_version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    pub fn with_packed_version(mut self, packed_version: i32) -> Self {
        self.packed_version = packed_version;
        self
    }

    pub fn doc_count(&self) -> u32 {
        self.doc_count
    }

    /// Adds a numeric field. `None` marks a document without a value; any `None`
    /// makes the writer persist a missing-value bitset.
    pub fn add_numeric(
        &mut self,
        name: &str,
        values: &[Option<i64>],
        layout: NumericLayout,
    ) -> anyhow::Result<u32> {
        self.check_len(name, values.len())?;
        let number = self.add_field(name, FieldKind::Numeric);
        let missing = missing_bitset(values.iter().map(Option::is_some));
        let dense: Vec<i64> = values.iter().map(|v| v.unwrap_or(0)).collect();
        self.write_numeric(number, &dense, missing, layout)?;
        Ok(number)
    }

    /// Adds a binary field; fixed width when every value has the same length.
    pub fn add_binary(
        &mut self,
        name: &str,
        values: &[Option<&[u8]>],
        block_size: usize,
    ) -> anyhow::Result<u32> {
        self.check_len(name, values.len())?;
        let number = self.add_field(name, FieldKind::Binary);
        let missing = missing_bitset(values.iter().map(Option::is_some));
        let dense: Vec<&[u8]> = values.iter().map(|v| v.unwrap_or_default()).collect();
        self.write_binary(number, &dense, missing, block_size);
        Ok(number)
    }

    /// Adds a sorted field. Ordinals are stored table-compressed when the column
    /// has at most 256 distinct ordinals, delta-encoded otherwise.
    pub fn add_sorted(&mut self, name: &str, values: &[Option<&[u8]>]) -> anyhow::Result<u32> {
        self.check_len(name, values.len())?;
        let number = self.add_field(name, FieldKind::Sorted);
        let terms = sorted_terms(values.iter().flatten().copied());
        let ords: Vec<i64> = values
            .iter()
            .map(|v| match v {
                Some(term) => ord_of(&terms, term),
                None => -1,
            })
            .collect();
        let layout = if terms.len() < 256 {
            NumericLayout::Table
        } else {
            NumericLayout::Delta { block_size: 1024 }
        };
        self.write_numeric(number, &ords, None, layout)?;
        self.write_dictionary(number, &terms)?;
        Ok(number)
    }

    /// Adds a sorted-set field. Each document's terms are deduplicated.
    pub fn add_sorted_set(
        &mut self,
        name: &str,
        values: &[Vec<&[u8]>],
        block_size: usize,
    ) -> anyhow::Result<u32> {
        self.check_len(name, values.len())?;
        let number = self.add_field(name, FieldKind::SortedSet);
        let terms = sorted_terms(values.iter().flatten().copied());
        let lists: Vec<Vec<u8>> = values
            .iter()
            .map(|doc| {
                let mut ords: Vec<i64> = doc.iter().map(|t| ord_of(&terms, t)).collect();
                ords.sort_unstable();
                ords.dedup();
                let mut list: Vec<u8> = Vec::new();
                let mut prev = 0;
                for ord in ords {
                    list.write_vlong(ord - prev);
                    prev = ord;
                }
                list
            })
            .collect();
        let refs: Vec<&[u8]> = lists.iter().map(Vec::as_slice).collect();
        self.write_binary_variable(number, &refs, None, block_size);
        self.write_dictionary(number, &terms)?;
        Ok(number)
    }

    /// Writes a raw table-compressed numeric column, whatever the table size.
    pub fn add_numeric_table_raw(
        &mut self,
        name: &str,
        table: &[i64],
        ords: &[u64],
        bits_per_value: u32,
    ) -> anyhow::Result<u32> {
        self.check_len(name, ords.len())?;
        let number = self.add_field(name, FieldKind::Numeric);
        let offset = self.data.len();
        self.data.write_vint(table.len() as i32);
        for &v in table {
            self.data.write_i64(v);
        }
        self.data.write_vint(bits_per_value as i32);
        packed::encode(&mut self.data, self.packed_version, ords, bits_per_value);
        self.numeric_entry(number, offset, None, numeric_encoding::TABLE);
        Ok(number)
    }

    /// Ends both streams and stores them in `store`.
    pub fn finish(mut self, store: &MemoryObjectStore) -> anyhow::Result<WrittenSegment> {
        let (meta, data) = self.finish_streams();
        let metadata_name =
            segment_stream_name(&self.segment_name, &self.segment_suffix, METADATA_EXTENSION);
        let data_name =
            segment_stream_name(&self.segment_name, &self.segment_suffix, DATA_EXTENSION);
        let segment = WrittenSegment {
            segment_name: self.segment_name.clone(),
            segment_suffix: self.segment_suffix.clone(),
            doc_count: self.doc_count,
            metadata_name,
            data_name,
            metadata_len: meta.len(),
            data_len: data.len(),
            fields: std::mem::take(&mut self.fields),
        };
        store.put(&segment.metadata_name, meta)?;
        store.put(&segment.data_name, data)?;
        Ok(segment)
    }

    /// Ends both streams and returns `(metadata, data)`.
    pub fn finish_streams(&mut self) -> (Vec<u8>, Vec<u8>) {
        let mut meta: Vec<u8> = Vec::new();
        header::write_header(&mut meta, METADATA_CODEC, self.version);
        meta.extend_from_slice(&self.meta);
        meta.write_vint(END_OF_CATALOG);

        let mut data: Vec<u8> = Vec::new();
        header::write_header(&mut data, DATA_CODEC, self.version);
        data.extend_from_slice(&self.data);

        if self.version >= VERSION_CHECKSUM {
            footer::write_footer(&mut meta);
            footer::write_footer(&mut data);
        }
        (meta, data)
    }

    fn check_len(&self, name: &str, len: usize) -> anyhow::Result<()> {
        if len != self.doc_count as usize {
            anyhow::bail!(
                "field '{name}' has {len} values, segment has {} documents",
                self.doc_count
            );
        }
        Ok(())
    }

    fn add_field(&mut self, name: &str, kind: FieldKind) -> u32 {
        let number = self.fields.len() as u32;
        self.fields.push(WrittenField {
            name: name.to_string(),
            number,
            kind,
        });
        number
    }

    /// Current end of the data stream, as an absolute stream offset.
    fn data_offset(&self) -> i64 {
        (header::header_len(DATA_CODEC) + self.data.len()) as i64
    }

    fn write_numeric(
        &mut self,
        number: u32,
        values: &[i64],
        missing: Option<Vec<u64>>,
        layout: NumericLayout,
    ) -> anyhow::Result<()> {
        let offset = self.data.len();
        if let Some(words) = &missing {
            for &w in words {
                self.data.write_u64(w);
            }
        }
        let tag = match layout {
            NumericLayout::Delta { block_size } => {
                self.data.write_vint(block_size as i32);
                block_packed::encode(&mut self.data, self.packed_version, block_size, values);
                numeric_encoding::DELTA
            }
            NumericLayout::Table => {
                let mut table = values.to_vec();
                table.sort_unstable();
                table.dedup();
                self.data.write_vint(table.len() as i32);
                for &v in &table {
                    self.data.write_i64(v);
                }
                let bits = packed::bits_required(table.len().saturating_sub(1) as u64);
                self.data.write_vint(bits as i32);
                let ords: Vec<u64> = values
                    .iter()
                    .map(|v| table.binary_search(v).unwrap_or(0) as u64)
                    .collect();
                packed::encode(&mut self.data, self.packed_version, &ords, bits);
                numeric_encoding::TABLE
            }
            NumericLayout::Uncompressed => {
                for &v in values {
                    let Ok(byte) = i8::try_from(v) else {
                        anyhow::bail!("value {v} does not fit an uncompressed column");
                    };
                    self.data.write_u8(byte as u8);
                }
                numeric_encoding::UNCOMPRESSED
            }
            NumericLayout::Gcd { block_size } => {
                let min = values.iter().copied().min().unwrap_or(0);
                let mult = values
                    .iter()
                    .fold(0i64, |g, &v| gcd(g, v.wrapping_sub(min)))
                    .max(1);
                let quotients: Vec<i64> = values
                    .iter()
                    .map(|&v| v.wrapping_sub(min) / mult)
                    .collect();
                self.data.write_i64(min);
                self.data.write_i64(mult);
                self.data.write_vint(block_size as i32);
                block_packed::encode(&mut self.data, self.packed_version, block_size, &quotients);
                numeric_encoding::GCD
            }
        };
        let missing_bytes = missing.map(|words| words.len() * 8);
        self.numeric_entry(number, offset, missing_bytes, tag);
        Ok(())
    }

    /// Appends a numeric catalog record; `offset` is relative to the data body.
    fn numeric_entry(&mut self, number: u32, offset: usize, missing_bytes: Option<usize>, tag: u8) {
        let offset = header::header_len(DATA_CODEC) as i64 + offset as i64;
        self.meta.write_vint(number as i32);
        self.meta.write_u8(entry_type::NUMBER);
        self.meta.write_i64(offset);
        match missing_bytes {
            Some(len) => {
                self.meta.write_i64(offset);
                self.meta.write_i64(len as i64);
            }
            None => self.meta.write_i64(NO_MISSING_BITSET),
        }
        self.meta.write_u8(tag);
        if tag != numeric_encoding::UNCOMPRESSED {
            self.meta.write_vint(self.packed_version);
        }
    }

    fn write_binary(
        &mut self,
        number: u32,
        values: &[&[u8]],
        missing: Option<Vec<u64>>,
        block_size: usize,
    ) {
        let min = values.iter().map(|v| v.len()).min().unwrap_or(0);
        let max = values.iter().map(|v| v.len()).max().unwrap_or(0);
        if min == max {
            let offset = self.data_offset();
            for v in values {
                self.data.write_slice(v);
            }
            let num_bytes = self.data_offset() - offset;
            let missing_offset = self.write_missing(&missing);
            self.binary_entry(number, offset, num_bytes, missing_offset, min, max, None);
        } else {
            self.write_binary_variable(number, values, missing, block_size);
        }
    }

    fn write_binary_variable(
        &mut self,
        number: u32,
        values: &[&[u8]],
        missing: Option<Vec<u64>>,
        block_size: usize,
    ) {
        let offset = self.data_offset();
        let mut ends = Vec::with_capacity(values.len());
        for v in values {
            self.data.write_slice(v);
            ends.push(self.data_offset() - offset);
        }
        let num_bytes = self.data_offset() - offset;
        let missing_offset = self.write_missing(&missing);
        monotonic::encode(&mut self.data, self.packed_version, block_size, &ends);
        let min = values.iter().map(|v| v.len()).min().unwrap_or(0);
        let max = values.iter().map(|v| v.len()).max().unwrap_or(0);
        // A variable-width column must not look fixed-width to the reader.
        let max = if min == max { max + 1 } else { max };
        self.binary_entry(
            number,
            offset,
            num_bytes,
            missing_offset,
            min,
            max,
            Some(block_size),
        );
    }

    fn write_missing(&mut self, missing: &Option<Vec<u64>>) -> Option<(i64, i64)> {
        let words = missing.as_ref()?;
        let offset = self.data_offset();
        for &w in words {
            self.data.write_u64(w);
        }
        Some((offset, words.len() as i64 * 8))
    }

    #[allow(clippy::too_many_arguments)]
    fn binary_entry(
        &mut self,
        number: u32,
        offset: i64,
        num_bytes: i64,
        missing: Option<(i64, i64)>,
        min: usize,
        max: usize,
        block_size: Option<usize>,
    ) {
        self.meta.write_vint(number as i32);
        self.meta.write_u8(entry_type::BYTES);
        self.meta.write_i64(offset);
        self.meta.write_i64(num_bytes);
        match missing {
            Some((missing_offset, missing_bytes)) => {
                self.meta.write_i64(missing_offset);
                self.meta.write_i64(missing_bytes);
            }
            None => self.meta.write_i64(NO_MISSING_BITSET),
        }
        self.meta.write_vint(min as i32);
        self.meta.write_vint(max as i32);
        if let Some(block_size) = block_size {
            self.meta.write_vint(self.packed_version);
            self.meta.write_vint(block_size as i32);
        }
    }

    fn write_dictionary(&mut self, number: u32, terms: &[Vec<u8>]) -> anyhow::Result<()> {
        let offset = if terms.is_empty() {
            0
        } else {
            let offset = self.data_offset();
            let mut builder = MapBuilder::memory();
            for (ord, term) in terms.iter().enumerate() {
                builder.insert(term, ord as u64)?;
            }
            let fst = builder.into_inner()?;
            self.data.write_vlong(fst.len() as i64);
            self.data.write_slice(&fst);
            offset
        };
        self.meta.write_vint(number as i32);
        self.meta.write_u8(entry_type::DICTIONARY);
        self.meta.write_i64(offset);
        self.meta.write_vlong(terms.len() as i64);
        Ok(())
    }
}

/// Bitset words for the given presence flags, or `None` when all are present.
fn missing_bitset(present: impl ExactSizeIterator<Item = bool>) -> Option<Vec<u64>> {
    let len = present.len();
    let mut words = vec![0u64; len.div_ceil(64)];
    let mut all = true;
    for (i, p) in present.enumerate() {
        if p {
            words[i >> 6] |= 1 << (i & 63);
        } else {
            all = false;
        }
    }
    (!all).then_some(words)
}

fn sorted_terms<'a>(terms: impl Iterator<Item = &'a [u8]>) -> Vec<Vec<u8>> {
    let mut terms: Vec<Vec<u8>> = terms.map(<[u8]>::to_vec).collect();
    terms.sort_unstable();
    terms.dedup();
    terms
}

fn ord_of(terms: &[Vec<u8>], term: &[u8]) -> i64 {
    terms
        .binary_search_by(|t| t.as_slice().cmp(term))
        .map_or(-1, |ord| ord as i64)
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a as i64
}
