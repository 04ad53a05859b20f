//! Doc-values producer: the read-only entry point to the columns of one segment.

use std::sync::{
    Arc, RwLock,
    atomic::{AtomicU64, Ordering},
};

use docvalues_bits::{Bits, FixedBitSet, MatchAllBits, MatchNoBits};
use docvalues_common::{Result, error::Error};
use docvalues_format::{
    defs::{
        DATA_CODEC, DATA_EXTENSION, METADATA_CODEC, METADATA_EXTENSION, VERSION_CHECKSUM,
        VERSION_CURRENT, VERSION_START, segment_stream_name,
    },
    footer, header,
};
use docvalues_io::{DataInput, ReadAt};
use docvalues_objectstore::ObjectStore;

use super::{
    binary::BinaryDocValues,
    catalog::{BinaryEntry, Catalog, DictionaryEntry, NumericEntry},
    dictionary::Dictionary,
    docs_with_field::{self, SortedPresence, SortedSetPresence},
    field::{DocValuesType, FieldInfo, FieldInfos, SegmentReadState},
    instance_cache::InstanceCache,
    numeric::NumericDocValues,
    sorted::SortedDocValues,
    sorted_set::SortedSetDocValues,
};

/// Options for opening a [`Producer`].
#[derive(Clone)]
pub struct ProducerOptions {
    object_store: Arc<dyn ObjectStore>,
    metadata_codec: String,
    data_codec: String,
    metadata_extension: String,
    data_extension: String,
    verify_checksum_on_open: bool,
}

impl ProducerOptions {
    /// Creates options reading segment streams from `object_store`, with the
    /// default codec names and stream extensions.
    pub fn new(object_store: Arc<dyn ObjectStore>) -> ProducerOptions {
        ProducerOptions {
            object_store,
            metadata_codec: METADATA_CODEC.to_string(),
            data_codec: DATA_CODEC.to_string(),
            metadata_extension: METADATA_EXTENSION.to_string(),
            data_extension: DATA_EXTENSION.to_string(),
            verify_checksum_on_open: false,
        }
    }

    /// Sets the codec name expected in the metadata stream header.
    pub fn metadata_codec(mut self, codec: impl Into<String>) -> Self {
        self.metadata_codec = codec.into();
        self
    }

    /// Sets the codec name expected in the data stream header.
    pub fn data_codec(mut self, codec: impl Into<String>) -> Self {
        self.data_codec = codec.into();
        self
    }

    pub fn metadata_extension(mut self, extension: impl Into<String>) -> Self {
        self.metadata_extension = extension.into();
        self
    }

    pub fn data_extension(mut self, extension: impl Into<String>) -> Self {
        self.data_extension = extension.into();
        self
    }

    /// When set, the whole data stream is checksummed at open instead of only
    /// having its footer validated. Defaults to `false`.
    pub fn verify_checksum_on_open(mut self, verify: bool) -> Self {
        self.verify_checksum_on_open = verify;
        self
    }

    /// Opens the doc-values streams of the segment described by `state`.
    ///
    /// The metadata stream is parsed completely and released before this returns;
    /// the data stream stays open until [`Producer::close`] or drop.
    pub fn open(&self, state: &SegmentReadState) -> Result<Producer> {
        self.open_inner(state).inspect_err(|e| {
            if e.is_corruption() {
                log::warn!("failed to open doc values of segment '{}': {e}", state.segment_name);
            }
        })
    }

    fn open_inner(&self, state: &SegmentReadState) -> Result<Producer> {
        let metadata_name = segment_stream_name(
            &state.segment_name,
            &state.segment_suffix,
            &self.metadata_extension,
        );
        let (version, catalog) = self.read_metadata(&metadata_name, &state.field_infos)?;

        let data_name = segment_stream_name(
            &state.segment_name,
            &state.segment_suffix,
            &self.data_extension,
        );
        let data = self
            .object_store
            .open(&data_name)
            .map_err(|e| Error::io(format!("open '{data_name}'"), e))?;
        let mut input = DataInput::new(data.clone(), data_name.as_str())?;
        let data_version =
            header::check_header(&mut input, &self.data_codec, VERSION_START, VERSION_CURRENT)?;
        if data_version != version {
            return Err(Error::corruption(
                data_name,
                format!("format versions mismatch: metadata {version}, data {data_version}"),
            ));
        }
        if version >= VERSION_CHECKSUM {
            if self.verify_checksum_on_open {
                footer::verify_checksum(data.as_ref(), &data_name)?;
            } else {
                footer::retrieve_checksum(data.as_ref(), &data_name)?;
            }
        }

        log::debug!(
            "opened doc values '{data_name}': version {version}, {} docs, {} catalog entries",
            state.doc_count,
            catalog.len()
        );

        let base_ram = std::mem::size_of::<Producer>() + catalog_ram_bytes(&catalog);
        Ok(Producer {
            segment_name: state.segment_name.clone(),
            doc_count: state.doc_count,
            version,
            catalog,
            field_infos: state.field_infos.clone(),
            data_name: data_name.into(),
            data: RwLock::new(Some(data)),
            numerics: InstanceCache::new(),
            binaries: InstanceCache::new(),
            dictionaries: InstanceCache::new(),
            docs_with_field: InstanceCache::new(),
            ram_bytes_used: AtomicU64::new(base_ram as u64),
        })
    }

    fn read_metadata(&self, name: &str, field_infos: &FieldInfos) -> Result<(i32, Catalog)> {
        let source = self
            .object_store
            .open(name)
            .map_err(|e| Error::io(format!("open '{name}'"), e))?;
        let mut input = DataInput::new(source, name)?;
        let version = header::check_header(
            &mut input,
            &self.metadata_codec,
            VERSION_START,
            VERSION_CURRENT,
        )?;
        let catalog = Catalog::read(&mut input, field_infos, version)?;
        if version >= VERSION_CHECKSUM {
            footer::check_footer(&mut input)?;
        } else if input.remaining() != 0 {
            return Err(Error::corruption(
                name,
                format!(
                    "{} unexpected bytes after the end of the catalog",
                    input.remaining()
                ),
            ));
        }
        log::debug!("read doc values metadata '{name}': {} entries", catalog.len());
        Ok((version, catalog))
    }
}

/// Read-only access to the doc-values columns of one segment.
///
/// Columns are decoded lazily on first request and cached for the lifetime of the
/// producer; repeated requests for the same field return the same instance. The
/// producer is safe to share between threads. Sorted and sorted-set views carry
/// per-caller cursor state, so each request returns a fresh view over the shared
/// decoded columns.
pub struct Producer {
    segment_name: String,
    doc_count: u32,
    version: i32,
    catalog: Catalog,
    field_infos: Arc<FieldInfos>,
    data_name: Arc<str>,
    /// `None` once closed.
    data: RwLock<Option<Arc<dyn ReadAt>>>,
    numerics: InstanceCache<Arc<NumericDocValues>>,
    binaries: InstanceCache<Arc<BinaryDocValues>>,
    dictionaries: InstanceCache<Arc<Dictionary>>,
    docs_with_field: InstanceCache<Arc<FixedBitSet>>,
    ram_bytes_used: AtomicU64,
}

impl Producer {
    pub fn segment_name(&self) -> &str {
        &self.segment_name
    }

    pub fn doc_count(&self) -> u32 {
        self.doc_count
    }

    /// Format version shared by the metadata and data streams.
    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn field_infos(&self) -> &Arc<FieldInfos> {
        &self.field_infos
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Returns the numeric column of `field`.
    pub fn get_numeric(&self, field: &FieldInfo) -> Result<Arc<NumericDocValues>> {
        self.ensure_open()?;
        let entry = self.numeric_entry(field)?;
        self.load_numeric(field, entry)
    }

    /// Returns the binary column of `field`.
    pub fn get_binary(&self, field: &FieldInfo) -> Result<Arc<BinaryDocValues>> {
        self.ensure_open()?;
        let entry = self.binary_entry(field)?;
        self.load_binary(field, entry)
    }

    /// Returns a fresh sorted view of `field`.
    pub fn get_sorted(&self, field: &FieldInfo) -> Result<SortedDocValues> {
        self.ensure_open()?;
        let dict_entry = self.dictionary_entry(field)?;
        if dict_entry.ord_count == 0 {
            return Ok(SortedDocValues::Empty {
                doc_count: self.doc_count,
            });
        }
        let ords = self.load_numeric(field, self.numeric_entry(field)?)?;
        let dict = self.load_dictionary(field, dict_entry)?;
        Ok(SortedDocValues::new(self.doc_count, ords, dict))
    }

    /// Returns a fresh sorted-set view of `field`.
    pub fn get_sorted_set(&self, field: &FieldInfo) -> Result<SortedSetDocValues> {
        self.ensure_open()?;
        let dict_entry = self.dictionary_entry(field)?;
        if dict_entry.ord_count == 0 {
            return Ok(SortedSetDocValues::Empty {
                doc_count: self.doc_count,
            });
        }
        let lists = self.load_binary(field, self.binary_entry(field)?)?;
        let dict = self.load_dictionary(field, dict_entry)?;
        Ok(SortedSetDocValues::new(self.doc_count, lists, dict))
    }

    /// Returns the set of documents that have a value for `field`.
    ///
    /// Numeric and binary fields use the bitset persisted with the column (all
    /// documents when there is none). Sorted fields report documents with an
    /// ordinal, sorted-set fields documents with at least one ordinal.
    pub fn get_docs_with_field(&self, field: &FieldInfo) -> Result<Arc<dyn Bits>> {
        self.ensure_open()?;
        match field.doc_values_type {
            DocValuesType::Numeric => {
                let entry = self.numeric_entry(field)?;
                self.persisted_bits(field, entry.missing_offset, entry.missing_bytes)
            }
            DocValuesType::Binary => {
                let entry = self.binary_entry(field)?;
                self.persisted_bits(field, entry.missing_offset, entry.missing_bytes)
            }
            DocValuesType::Sorted => {
                let dict_entry = self.dictionary_entry(field)?;
                if dict_entry.ord_count == 0 {
                    return Ok(Arc::new(MatchNoBits::new(self.doc_count as usize)));
                }
                let ords = self.load_numeric(field, self.numeric_entry(field)?)?;
                Ok(Arc::new(SortedPresence::new(ords, self.doc_count)))
            }
            DocValuesType::SortedSet => {
                let dict_entry = self.dictionary_entry(field)?;
                if dict_entry.ord_count == 0 {
                    return Ok(Arc::new(MatchNoBits::new(self.doc_count as usize)));
                }
                let lists = self.load_binary(field, self.binary_entry(field)?)?;
                Ok(Arc::new(SortedSetPresence::new(lists, self.doc_count)))
            }
            DocValuesType::None => Err(Error::contract_violation(format!(
                "field '{}' has no doc values",
                field.name
            ))),
        }
    }

    /// Verifies the checksum of the whole data stream. Streams written before
    /// checksums were introduced have nothing to verify.
    pub fn check_integrity(&self) -> Result<()> {
        let data = self.data_source()?;
        if self.version < VERSION_CHECKSUM {
            return Ok(());
        }
        footer::verify_checksum(data.as_ref(), &self.data_name).inspect_err(|e| {
            log::warn!("integrity check of '{}' failed: {e}", self.data_name);
        })
    }

    /// Approximate heap footprint of the producer and every column decoded so far.
    ///
    /// Never decreases.
    pub fn approximate_memory_usage(&self) -> u64 {
        self.ram_bytes_used.load(Ordering::Relaxed)
    }

    /// Releases the data stream. Every later request fails, as does a second close.
    pub fn close(&self) -> Result<()> {
        let closed = self.data.write().expect("write lock").take();
        match closed {
            Some(_) => {
                log::debug!("closed doc values '{}'", self.data_name);
                Ok(())
            }
            None => Err(Error::contract_violation(format!(
                "doc values '{}' already closed",
                self.data_name
            ))),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.data.read().expect("read lock").is_none()
    }

    fn ensure_open(&self) -> Result<()> {
        self.data_source().map(|_| ())
    }

    fn data_source(&self) -> Result<Arc<dyn ReadAt>> {
        self.data
            .read()
            .expect("read lock")
            .clone()
            .ok_or_else(|| {
                Error::contract_violation(format!("doc values '{}' are closed", self.data_name))
            })
    }

    /// A fresh cursor over the data stream; loads never share a read position.
    fn data_input(&self) -> Result<DataInput> {
        DataInput::new(self.data_source()?, self.data_name.clone())
    }

    fn numeric_entry(&self, field: &FieldInfo) -> Result<&NumericEntry> {
        self.catalog
            .numerics
            .get(&field.number)
            .ok_or_else(|| missing_entry(field, "numeric"))
    }

    fn binary_entry(&self, field: &FieldInfo) -> Result<&BinaryEntry> {
        self.catalog
            .binaries
            .get(&field.number)
            .ok_or_else(|| missing_entry(field, "binary"))
    }

    fn dictionary_entry(&self, field: &FieldInfo) -> Result<&DictionaryEntry> {
        self.catalog
            .dictionaries
            .get(&field.number)
            .ok_or_else(|| missing_entry(field, "dictionary"))
    }

    fn load_numeric(
        &self,
        field: &FieldInfo,
        entry: &NumericEntry,
    ) -> Result<Arc<NumericDocValues>> {
        let (values, created) = self.numerics.get_or_try_init(field.number, || {
            let mut input = self.data_input()?;
            NumericDocValues::load(&mut input, entry, self.doc_count).map(Arc::new)
        })?;
        if created {
            self.track("numeric", field, values.ram_bytes_used());
        } else {
            log::trace!("numeric '{}': cache hit", field.name);
        }
        Ok(values)
    }

    fn load_binary(&self, field: &FieldInfo, entry: &BinaryEntry) -> Result<Arc<BinaryDocValues>> {
        let (values, created) = self.binaries.get_or_try_init(field.number, || {
            let mut input = self.data_input()?;
            BinaryDocValues::load(&mut input, entry, self.doc_count).map(Arc::new)
        })?;
        if created {
            self.track("binary", field, values.ram_bytes_used());
        } else {
            log::trace!("binary '{}': cache hit", field.name);
        }
        Ok(values)
    }

    fn load_dictionary(
        &self,
        field: &FieldInfo,
        entry: &DictionaryEntry,
    ) -> Result<Arc<Dictionary>> {
        let (dict, created) = self.dictionaries.get_or_try_init(field.number, || {
            let mut input = self.data_input()?;
            Dictionary::load(&mut input, entry).map(Arc::new)
        })?;
        if created {
            self.track("dictionary", field, dict.ram_bytes_used());
        } else {
            log::trace!("dictionary '{}': cache hit", field.name);
        }
        Ok(dict)
    }

    fn persisted_bits(
        &self,
        field: &FieldInfo,
        missing_offset: Option<u64>,
        missing_bytes: u64,
    ) -> Result<Arc<dyn Bits>> {
        let Some(missing_offset) = missing_offset else {
            return Ok(Arc::new(MatchAllBits::new(self.doc_count as usize)));
        };
        let (bits, created) = self.docs_with_field.get_or_try_init(field.number, || {
            let mut input = self.data_input()?;
            docs_with_field::load_bitset(&mut input, missing_offset, missing_bytes, self.doc_count)
                .map(Arc::new)
        })?;
        if created {
            self.track("docs-with-field", field, bits.ram_bytes_used());
        } else {
            log::trace!("docs-with-field '{}': cache hit", field.name);
        }
        Ok(bits)
    }

    fn track(&self, kind: &str, field: &FieldInfo, bytes: usize) {
        self.ram_bytes_used
            .fetch_add(bytes as u64, Ordering::Relaxed);
        log::debug!(
            "loaded {kind} '{}' (#{}) from '{}': {bytes} bytes",
            field.name,
            field.number,
            self.data_name
        );
    }
}

impl std::fmt::Debug for Producer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Producer")
            .field("segment", &self.segment_name)
            .field("version", &self.version)
            .field("doc_count", &self.doc_count)
            .field("numerics", &self.catalog.numerics.len())
            .field("binaries", &self.catalog.binaries.len())
            .field("dictionaries", &self.catalog.dictionaries.len())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

fn missing_entry(field: &FieldInfo, kind: &str) -> Error {
    Error::contract_violation(format!(
        "field '{}' (#{}) has no {kind} entry",
        field.name, field.number
    ))
}

fn catalog_ram_bytes(catalog: &Catalog) -> usize {
    catalog.numerics.len() * std::mem::size_of::<(u32, NumericEntry)>()
        + catalog.binaries.len() * std::mem::size_of::<(u32, BinaryEntry)>()
        + catalog.dictionaries.len() * std::mem::size_of::<(u32, DictionaryEntry)>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_producer_is_send_sync() {
        assert_send_sync::<Producer>();
        assert_send_sync::<Arc<NumericDocValues>>();
        assert_send_sync::<Arc<BinaryDocValues>>();
        assert_send_sync::<SortedDocValues>();
        assert_send_sync::<SortedSetDocValues>();
    }

    #[test]
    fn test_missing_entry_message() {
        let field = FieldInfo::new("price", 4, DocValuesType::Numeric);
        let e = missing_entry(&field, "binary");
        assert!(e.is_contract_violation());
        assert!(e.to_string().contains("price"));
    }
}
