use std::sync::Arc;

use docvalues_testkit::{data_gen, segment_writer::SegmentWriter};

use crate::{read::binary::BinaryDocValues, tests::segment_store::SegmentStore};

#[test]
fn test_fixed_width() {
    let values: Vec<Vec<u8>> = (0..200u32).map(|i| i.to_be_bytes().to_vec()).collect();
    let refs: Vec<Option<&[u8]>> = values.iter().map(|v| Some(v.as_slice())).collect();
    let mut writer = SegmentWriter::new("_0", 200);
    writer.add_binary("id", &refs, 64).unwrap();
    let store = SegmentStore::new();
    let segment = store.write(writer);
    let producer = store.open(&segment);

    let ids = producer.get_binary(&segment.field("id")).unwrap();
    assert!(matches!(*ids, BinaryDocValues::Fixed { len: 4, .. }));
    for (doc, v) in values.iter().enumerate() {
        assert_eq!(ids.get(doc as u32), v.as_slice());
    }
    assert!(Arc::ptr_eq(
        &ids,
        &producer.get_binary(&segment.field("id")).unwrap()
    ));
}

#[test]
fn test_variable_width_with_missing() {
    let mut rng = fastrand::Rng::with_seed(11);
    let terms = data_gen::random_terms(&mut rng, 40, 12);
    let values = data_gen::random_picks(&mut rng, &terms, 1500, 15);
    let mut writer = SegmentWriter::new("_0", 1500);
    writer.add_binary("body", &values, 128).unwrap();
    let store = SegmentStore::new();
    let segment = store.write(writer);
    let producer = store.open(&segment);
    let field = segment.field("body");

    let body = producer.get_binary(&field).unwrap();
    assert!(matches!(*body, BinaryDocValues::Variable { .. }));
    let present = producer.get_docs_with_field(&field).unwrap();
    for (doc, v) in values.iter().enumerate() {
        assert_eq!(body.get(doc as u32), v.unwrap_or_default(), "doc {doc}");
        assert_eq!(present.get(doc), v.is_some(), "doc {doc}");
    }
}

#[test]
fn test_missing_at_both_ends() {
    let mut values: Vec<Option<&[u8]>> = vec![Some(&b"xy"[..]); 100];
    values[0] = None;
    values[99] = None;
    let mut writer = SegmentWriter::new("_0", 100);
    writer.add_binary("b", &values, 64).unwrap();
    let store = SegmentStore::new();
    let segment = store.write(writer);
    let producer = store.open(&segment);
    let present = producer.get_docs_with_field(&segment.field("b")).unwrap();
    assert!(!present.get(0));
    assert!(present.get(1));
    assert!(present.get(98));
    assert!(!present.get(99));
    let b = producer.get_binary(&segment.field("b")).unwrap();
    assert_eq!(b.get(0), b"");
    assert_eq!(b.get(50), b"xy");
}
