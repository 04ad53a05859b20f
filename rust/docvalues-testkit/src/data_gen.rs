//! Seeded random data for doc-values tests.
//!
//! Every generator takes an explicit `fastrand::Rng` so failures reproduce from the
//! seed alone.

/// Distinct random terms of `1..=max_len` lowercase ASCII bytes.
pub fn random_terms(rng: &mut fastrand::Rng, count: usize, max_len: usize) -> Vec<Vec<u8>> {
    assert!(max_len > 0);
    let mut terms = std::collections::BTreeSet::new();
    while terms.len() < count {
        let len = rng.usize(1..=max_len);
        let term: Vec<u8> = (0..len).map(|_| rng.u8(b'a'..=b'z')).collect();
        terms.insert(term);
    }
    let mut terms: Vec<Vec<u8>> = terms.into_iter().collect();
    rng.shuffle(&mut terms);
    terms
}

/// Random values in `range`, with roughly `missing_pct` percent of documents
/// left without a value.
pub fn random_numerics(
    rng: &mut fastrand::Rng,
    count: usize,
    range: std::ops::RangeInclusive<i64>,
    missing_pct: u8,
) -> Vec<Option<i64>> {
    (0..count)
        .map(|_| (rng.u8(0..100) >= missing_pct).then(|| rng.i64(range.clone())))
        .collect()
}

/// Per-document picks from `terms`, with roughly `missing_pct` percent of
/// documents left without a value.
pub fn random_picks<'a>(
    rng: &mut fastrand::Rng,
    terms: &'a [Vec<u8>],
    count: usize,
    missing_pct: u8,
) -> Vec<Option<&'a [u8]>> {
    (0..count)
        .map(|_| {
            (rng.u8(0..100) >= missing_pct).then(|| terms[rng.usize(..terms.len())].as_slice())
        })
        .collect()
}

/// Per-document subsets of `terms` of at most `max_per_doc` entries, possibly empty.
pub fn random_sets<'a>(
    rng: &mut fastrand::Rng,
    terms: &'a [Vec<u8>],
    count: usize,
    max_per_doc: usize,
) -> Vec<Vec<&'a [u8]>> {
    (0..count)
        .map(|_| {
            let n = rng.usize(0..=max_per_doc);
            (0..n)
                .map(|_| terms[rng.usize(..terms.len())].as_slice())
                .collect()
        })
        .collect()
}
