//! Field registry: the caller-supplied description of the fields of a segment.

use std::sync::Arc;

use ahash::AHashMap;
use docvalues_common::{Result, error::Error};

/// Kind of doc-values column stored for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocValuesType {
    /// The field has no doc values.
    None,
    /// One `i64` per document.
    Numeric,
    /// One byte string per document.
    Binary,
    /// One ordinal per document into a per-field ordered dictionary.
    Sorted,
    /// An ascending set of ordinals per document into a per-field ordered dictionary.
    SortedSet,
}

/// Describes a single field of a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub number: u32,
    pub doc_values_type: DocValuesType,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, number: u32, doc_values_type: DocValuesType) -> FieldInfo {
        FieldInfo {
            name: name.into(),
            number,
            doc_values_type,
        }
    }
}

/// Collection of the fields of a segment, addressable by number and by name.
#[derive(Debug, Clone, Default)]
pub struct FieldInfos {
    by_number: AHashMap<u32, Arc<FieldInfo>>,
    by_name: AHashMap<String, u32>,
}

impl FieldInfos {
    /// Builds the registry, rejecting duplicate numbers or names.
    pub fn new(fields: impl IntoIterator<Item = FieldInfo>) -> Result<FieldInfos> {
        let mut infos = FieldInfos::default();
        for field in fields {
            if infos.by_number.contains_key(&field.number) {
                return Err(Error::invalid_arg(
                    "fields",
                    format!("duplicate field number {}", field.number),
                ));
            }
            if infos.by_name.contains_key(&field.name) {
                return Err(Error::invalid_arg(
                    "fields",
                    format!("duplicate field name '{}'", field.name),
                ));
            }
            infos.by_name.insert(field.name.clone(), field.number);
            infos.by_number.insert(field.number, Arc::new(field));
        }
        Ok(infos)
    }

    pub fn by_number(&self, number: u32) -> Option<&Arc<FieldInfo>> {
        self.by_number.get(&number)
    }

    pub fn by_name(&self, name: &str) -> Option<&Arc<FieldInfo>> {
        self.by_name
            .get(name)
            .and_then(|number| self.by_number.get(number))
    }

    pub fn len(&self) -> usize {
        self.by_number.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_number.is_empty()
    }

    /// Fields in ascending field-number order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<FieldInfo>> {
        let mut fields: Vec<_> = self.by_number.values().collect();
        fields.sort_by_key(|f| f.number);
        fields.into_iter()
    }
}

/// Everything needed to locate and interpret the doc-values streams of one segment.
#[derive(Debug, Clone)]
pub struct SegmentReadState {
    /// Segment name, the common prefix of the segment's stream names, e.g. `_0`.
    pub segment_name: String,
    /// Optional per-format suffix, joined to the segment name with `_`.
    pub segment_suffix: String,
    /// Number of documents in the segment.
    pub doc_count: u32,
    pub field_infos: Arc<FieldInfos>,
}

impl SegmentReadState {
    pub fn new(
        segment_name: impl Into<String>,
        doc_count: u32,
        field_infos: Arc<FieldInfos>,
    ) -> SegmentReadState {
        SegmentReadState {
            segment_name: segment_name.into(),
            segment_suffix: String::new(),
            doc_count,
            field_infos,
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.segment_suffix = suffix.into();
        self
    }
}
