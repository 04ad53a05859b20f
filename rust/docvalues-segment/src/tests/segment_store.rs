use std::sync::Arc;

use docvalues_objectstore::{MemoryObjectStore, ObjectStore};
use docvalues_testkit::segment_writer::{FieldKind, SegmentWriter, WrittenField, WrittenSegment};

use crate::read::{
    field::{DocValuesType, FieldInfo, FieldInfos, SegmentReadState},
    producer::{Producer, ProducerOptions},
};

pub struct SegmentStore {
    pub object_store: Arc<MemoryObjectStore>,
}

impl Default for SegmentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentStore {
    pub fn new() -> SegmentStore {
        SegmentStore {
            object_store: Arc::new(MemoryObjectStore::new()),
        }
    }

    /// Finishes `writer` into the store.
    pub fn write(&self, writer: SegmentWriter) -> Segment {
        let written = writer.finish(&self.object_store).unwrap();
        let state = SegmentReadState::new(
            written.segment_name.clone(),
            written.doc_count,
            field_infos(&written.fields),
        )
        .with_suffix(written.segment_suffix.clone());
        Segment { written, state }
    }

    pub fn options(&self) -> ProducerOptions {
        ProducerOptions::new(self.object_store.clone() as Arc<dyn ObjectStore>)
    }

    pub fn open(&self, segment: &Segment) -> Producer {
        self.options().open(&segment.state).unwrap()
    }
}

pub struct Segment {
    pub written: WrittenSegment,
    pub state: SegmentReadState,
}

impl Segment {
    pub fn field(&self, name: &str) -> Arc<FieldInfo> {
        self.state
            .field_infos
            .by_name(name)
            .unwrap_or_else(|| panic!("no field '{name}'"))
            .clone()
    }
}

pub fn field_infos(fields: &[WrittenField]) -> Arc<FieldInfos> {
    Arc::new(
        FieldInfos::new(fields.iter().map(|f| {
            let doc_values_type = match f.kind {
                FieldKind::Numeric => DocValuesType::Numeric,
                FieldKind::Binary => DocValuesType::Binary,
                FieldKind::Sorted => DocValuesType::Sorted,
                FieldKind::SortedSet => DocValuesType::SortedSet,
            };
            FieldInfo::new(f.name.clone(), f.number, doc_values_type)
        }))
        .unwrap(),
    )
}
