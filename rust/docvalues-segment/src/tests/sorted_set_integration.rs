use std::sync::Arc;

use docvalues_testkit::{data_gen, segment_writer::SegmentWriter};

use crate::{
    read::sorted_set::{NO_MORE_ORDS, SortedSetDocValues},
    tests::segment_store::{Segment, SegmentStore},
};

/// Terms `t000..t{n-1}`, so that term `i` gets ordinal `i`.
fn numbered_terms(n: usize) -> Vec<Vec<u8>> {
    (0..n).map(|i| format!("t{i:03}").into_bytes()).collect()
}

fn write_sets(store: &SegmentStore, sets: &[Vec<&[u8]>], block_size: usize) -> Segment {
    let mut writer = SegmentWriter::new("_0", sets.len() as u32);
    writer.add_sorted_set("tags", sets, block_size).unwrap();
    store.write(writer)
}

#[test]
fn test_empty_doc_and_three_ords_across_block_sizes() {
    let terms = numbered_terms(10);
    let t = |i: usize| terms[i].as_slice();
    for block_size in [64, 128, 1024, 1 << 16] {
        let mut sets: Vec<Vec<&[u8]>> = (0..300).map(|i| vec![t(i % 10)]).collect();
        sets[0] = vec![];
        sets[150] = vec![t(9), t(3), t(7), t(3)];
        sets[299] = vec![];
        let store = SegmentStore::new();
        let segment = write_sets(&store, &sets, block_size);
        let producer = store.open(&segment);
        let mut view = producer.get_sorted_set(&segment.field("tags")).unwrap();

        view.set_document(0);
        assert_eq!(view.next_ord(), NO_MORE_ORDS, "block size {block_size}");

        view.set_document(150);
        let ords: Vec<i64> = std::iter::from_fn(|| {
            let ord = view.next_ord();
            (ord != NO_MORE_ORDS).then_some(ord)
        })
        .collect();
        assert_eq!(ords, vec![3, 7, 9], "block size {block_size}");

        assert_eq!(view.ords(299).count(), 0);
        assert_eq!(view.ords(1).collect::<Vec<_>>(), vec![1]);
        assert_eq!(view.lookup_ord(7).unwrap(), b"t007");
    }
}

#[test]
fn test_random_sets_round_trip() {
    let mut rng = fastrand::Rng::with_seed(23);
    let terms = data_gen::random_terms(&mut rng, 80, 6);
    let sets = data_gen::random_sets(&mut rng, &terms, 700, 5);
    let store = SegmentStore::new();
    let segment = write_sets(&store, &sets, 256);
    let producer = store.open(&segment);
    let field = segment.field("tags");
    let mut view = producer.get_sorted_set(&field).unwrap();
    let present = producer.get_docs_with_field(&field).unwrap();

    for (doc, set) in sets.iter().enumerate() {
        let mut expected: Vec<&[u8]> = set.clone();
        expected.sort_unstable();
        expected.dedup();
        let ords: Vec<i64> = view.ords(doc as u32).collect();
        assert!(ords.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(ords.len(), expected.len(), "doc {doc}");
        for (ord, term) in ords.iter().zip(&expected) {
            assert_eq!(view.lookup_ord(*ord).unwrap(), *term);
            assert_eq!(view.lookup_term(term), *ord);
        }
        assert_eq!(present.get(doc), !expected.is_empty());
    }
}

#[test]
fn test_sorted_set_empty_dictionary() {
    let sets: Vec<Vec<&[u8]>> = vec![vec![]; 5];
    let store = SegmentStore::new();
    let segment = write_sets(&store, &sets, 64);
    let producer = store.open(&segment);
    let field = segment.field("tags");
    let mut view = producer.get_sorted_set(&field).unwrap();
    assert!(matches!(view, SortedSetDocValues::Empty { doc_count: 5 }));
    view.set_document(4);
    assert_eq!(view.next_ord(), NO_MORE_ORDS);
    assert_eq!(view.value_count(), 0);
    let present = producer.get_docs_with_field(&field).unwrap();
    assert!((0..5).all(|d| !present.get(d)));
}

#[test]
fn test_concurrent_readers() {
    let terms = numbered_terms(50);
    let sets: Vec<Vec<&[u8]>> = (0..2000)
        .map(|i| (0..i % 4).map(|k| terms[(i + k * 13) % 50].as_slice()).collect())
        .collect();
    let store = SegmentStore::new();
    let segment = write_sets(&store, &sets, 512);
    let producer = Arc::new(store.open(&segment));
    let field = segment.field("tags");

    let expected: Vec<Vec<i64>> = sets
        .iter()
        .map(|set| {
            let mut ords: Vec<i64> = set
                .iter()
                .map(|t| std::str::from_utf8(&t[1..]).unwrap().parse().unwrap())
                .collect();
            ords.sort_unstable();
            ords.dedup();
            ords
        })
        .collect();
    let expected = Arc::new(expected);

    std::thread::scope(|scope| {
        for thread in 0..8 {
            let producer = producer.clone();
            let field = field.clone();
            let expected = expected.clone();
            scope.spawn(move || {
                let mut view = producer.get_sorted_set(&field).unwrap();
                for doc in (thread..2000).step_by(3) {
                    view.set_document(doc as u32);
                    let mut ords = Vec::new();
                    loop {
                        let ord = view.next_ord();
                        if ord == NO_MORE_ORDS {
                            break;
                        }
                        ords.push(ord);
                    }
                    assert_eq!(ords, expected[doc], "doc {doc}");
                    if let Some(&first) = ords.first() {
                        let term = view.lookup_ord(first).unwrap().to_vec();
                        assert_eq!(term, format!("t{first:03}").into_bytes());
                    }
                }
            });
        }
    });

    // Every thread went through the same cached columns.
    let a = producer.get_binary(&field).unwrap();
    let b = producer.get_binary(&field).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}
