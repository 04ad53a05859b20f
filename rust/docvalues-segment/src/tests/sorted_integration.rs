use std::sync::Arc;

use docvalues_testkit::{data_gen, segment_writer::SegmentWriter};

use crate::{
    read::{sorted::SortedDocValues, terms_enum::SeekStatus},
    tests::segment_store::SegmentStore,
};

#[test]
fn test_sorted_round_trip() {
    let mut rng = fastrand::Rng::with_seed(3);
    let terms = data_gen::random_terms(&mut rng, 120, 10);
    let values = data_gen::random_picks(&mut rng, &terms, 2000, 5);
    let mut writer = SegmentWriter::new("_0", 2000);
    writer.add_sorted("color", &values).unwrap();
    let store = SegmentStore::new();
    let segment = store.write(writer);
    let producer = store.open(&segment);

    let mut sorted = producer.get_sorted(&segment.field("color")).unwrap();
    let mut distinct: Vec<&[u8]> = values.iter().flatten().copied().collect();
    distinct.sort_unstable();
    distinct.dedup();
    assert_eq!(sorted.value_count(), distinct.len() as u64);

    for (doc, v) in values.iter().enumerate() {
        let ord = sorted.ord(doc as u32);
        match v {
            None => assert_eq!(ord, -1, "doc {doc}"),
            Some(term) => {
                assert!(ord >= 0);
                assert_eq!(sorted.lookup_ord(ord).unwrap(), *term, "doc {doc}");
                assert_eq!(sorted.lookup_term(term), ord);
            }
        }
    }

    for (ord, term) in distinct.iter().enumerate() {
        assert_eq!(sorted.lookup_term(term), ord as i64);
        assert_eq!(sorted.lookup_ord(ord as i64).unwrap(), *term);
    }
}

#[test]
fn test_sorted_insertion_points() {
    let values: Vec<Option<&[u8]>> = vec![
        Some(&b"delta"[..]),
        Some(&b"alpha"[..]),
        None,
        Some(&b"charlie"[..]),
        Some(&b"alpha"[..]),
    ];
    let mut writer = SegmentWriter::new("_0", 5);
    writer.add_sorted("s", &values).unwrap();
    let store = SegmentStore::new();
    let segment = store.write(writer);
    let producer = store.open(&segment);
    let sorted = producer.get_sorted(&segment.field("s")).unwrap();

    assert_eq!(sorted.value_count(), 3);
    assert_eq!(sorted.lookup_term(b"alpha"), 0);
    assert_eq!(sorted.lookup_term(b"charlie"), 1);
    assert_eq!(sorted.lookup_term(b"delta"), 2);
    assert_eq!(sorted.lookup_term(b"a"), -1);
    assert_eq!(sorted.lookup_term(b"bravo"), -2);
    assert_eq!(sorted.lookup_term(b"echo"), -4);
    assert_eq!(
        (0..5).map(|d| sorted.ord(d)).collect::<Vec<_>>(),
        vec![2, 0, -1, 1, 0]
    );
}

#[test]
fn test_sorted_terms_enum() {
    let values: Vec<Option<&[u8]>> = ["kiwi", "apple", "fig", "apple", "banana"]
        .iter()
        .map(|s| Some(s.as_bytes()))
        .collect();
    let mut writer = SegmentWriter::new("_0", 5);
    writer.add_sorted("fruit", &values).unwrap();
    let store = SegmentStore::new();
    let segment = store.write(writer);
    let producer = store.open(&segment);
    let sorted = producer.get_sorted(&segment.field("fruit")).unwrap();

    let mut te = sorted.terms_enum().unwrap();
    let mut all = Vec::new();
    while let Some(term) = te.next_term() {
        all.push(String::from_utf8(term.to_vec()).unwrap());
    }
    assert_eq!(all, vec!["apple", "banana", "fig", "kiwi"]);

    assert_eq!(te.seek_ceil(b"c"), SeekStatus::NotFound);
    assert_eq!(te.term().unwrap(), b"fig");
    assert_eq!(te.ord(), Some(2));
    assert_eq!(te.seek_ceil(b"kiwis"), SeekStatus::End);
    assert!(te.seek_exact_ord(1));
    assert_eq!(te.term().unwrap(), b"banana");
}

#[test]
fn test_sorted_high_cardinality() {
    let mut rng = fastrand::Rng::with_seed(99);
    let terms = data_gen::random_terms(&mut rng, 1000, 8);
    let values: Vec<Option<&[u8]>> = terms.iter().map(|t| Some(t.as_slice())).collect();
    let mut writer = SegmentWriter::new("_0", 1000);
    writer.add_sorted("id", &values).unwrap();
    let store = SegmentStore::new();
    let segment = store.write(writer);
    let producer = store.open(&segment);
    let mut sorted = producer.get_sorted(&segment.field("id")).unwrap();
    assert_eq!(sorted.value_count(), 1000);
    for (doc, term) in terms.iter().enumerate() {
        assert_eq!(sorted.get(doc as u32).unwrap().unwrap(), term.as_slice());
    }
}

#[test]
fn test_sorted_presence_and_empty_dictionary() {
    let values: Vec<Option<&[u8]>> = vec![None, Some(&b"x"[..]), None, Some(&b"y"[..])];
    let mut writer = SegmentWriter::new("_0", 4);
    writer.add_sorted("some", &values).unwrap();
    writer.add_sorted("none", &[None; 4]).unwrap();
    let store = SegmentStore::new();
    let segment = store.write(writer);
    let producer = store.open(&segment);

    let present = producer.get_docs_with_field(&segment.field("some")).unwrap();
    assert_eq!(
        (0..4).map(|d| present.get(d)).collect::<Vec<_>>(),
        vec![false, true, false, true]
    );

    let none = segment.field("none");
    let mut empty = producer.get_sorted(&none).unwrap();
    assert!(matches!(empty, SortedDocValues::Empty { doc_count: 4 }));
    assert_eq!(empty.ord(3), -1);
    assert!(empty.lookup_ord(0).unwrap_err().is_contract_violation());
    let absent = producer.get_docs_with_field(&none).unwrap();
    assert!((0..4).all(|d| !absent.get(d)));
}

#[test]
fn test_sorted_views_are_independent() {
    let values: Vec<Option<&[u8]>> = vec![Some(&b"a"[..]), Some(&b"b"[..]), Some(&b"c"[..])];
    let mut writer = SegmentWriter::new("_0", 3);
    writer.add_sorted("s", &values).unwrap();
    let store = SegmentStore::new();
    let segment = store.write(writer);
    let producer = store.open(&segment);
    let field = segment.field("s");

    let mut first = producer.get_sorted(&field).unwrap();
    let mut second = producer.get_sorted(&field).unwrap();
    let mut te = first.terms_enum().unwrap();
    assert_eq!(te.next_term().unwrap(), b"a");
    assert_eq!(second.lookup_ord(2).unwrap(), b"c");
    assert_eq!(first.lookup_ord(1).unwrap(), b"b");
    assert_eq!(te.next_term().unwrap(), b"b");
}

#[test]
fn test_sorted_dictionary_is_shared() {
    let values: Vec<Option<&[u8]>> = vec![Some(&b"x"[..]), None, Some(&b"y"[..])];
    let mut writer = SegmentWriter::new("_0", 3);
    writer.add_sorted("s", &values).unwrap();
    let store = SegmentStore::new();
    let segment = store.write(writer);
    let producer = store.open(&segment);
    let field = segment.field("s");

    let a = producer.get_sorted(&field).unwrap();
    let b = producer.get_sorted(&field).unwrap();
    let (a, b) = (a.terms_enum().unwrap(), b.terms_enum().unwrap());
    assert!(Arc::ptr_eq(a.dictionary(), b.dictionary()));

    let other = store.open(&segment);
    let c = other.get_sorted(&field).unwrap().terms_enum().unwrap();
    assert!(!Arc::ptr_eq(a.dictionary(), c.dictionary()));
}
