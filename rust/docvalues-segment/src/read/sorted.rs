//! Single-valued ordered string view.

use std::sync::Arc;

use docvalues_common::{Result, error::Error};

use super::{dictionary::Dictionary, numeric::NumericDocValues, terms_enum::TermsEnum};

/// Per-document ordinal into an ordered dictionary; `-1` means no value.
///
/// A view carries its own dictionary cursor and is meant to be used by one caller
/// at a time. Clone it (or ask the producer again) for another thread.
#[derive(Debug, Clone)]
pub enum SortedDocValues {
    /// The field's dictionary is empty: no document has a value.
    Empty { doc_count: u32 },
    Dictionary {
        doc_count: u32,
        ords: Arc<NumericDocValues>,
        cursor: TermsEnum,
    },
}

impl SortedDocValues {
    pub fn new(doc_count: u32, ords: Arc<NumericDocValues>, dict: Arc<Dictionary>) -> Self {
        SortedDocValues::Dictionary {
            doc_count,
            ords,
            cursor: dict.terms_enum(),
        }
    }

    pub fn doc_count(&self) -> u32 {
        match self {
            SortedDocValues::Empty { doc_count } | SortedDocValues::Dictionary { doc_count, .. } => {
                *doc_count
            }
        }
    }

    /// Ordinal of document `doc`, `-1` if it has no value.
    #[inline]
    pub fn ord(&self, doc: u32) -> i64 {
        match self {
            SortedDocValues::Empty { .. } => -1,
            SortedDocValues::Dictionary { ords, .. } => ords.get(doc),
        }
    }

    /// Bytes of the term with ordinal `ord`.
    ///
    /// The returned slice is valid until the next call on this view.
    pub fn lookup_ord(&mut self, ord: i64) -> Result<&[u8]> {
        let value_count = self.value_count();
        if let SortedDocValues::Dictionary { cursor, .. } = self
            && ord >= 0
            && cursor.seek_exact_ord(ord as u64)
        {
            return Ok(cursor.term().unwrap_or_default());
        }
        Err(Error::contract_violation(format!(
            "ordinal {ord} out of range [0, {value_count})"
        )))
    }

    /// Ordinal of `term`, or `-(insertion_point) - 1` if absent.
    pub fn lookup_term(&self, term: &[u8]) -> i64 {
        match self {
            SortedDocValues::Empty { .. } => -1,
            SortedDocValues::Dictionary { cursor, .. } => cursor.dictionary().lookup_term(term),
        }
    }

    /// Number of distinct terms.
    pub fn value_count(&self) -> u64 {
        match self {
            SortedDocValues::Empty { .. } => 0,
            SortedDocValues::Dictionary { cursor, .. } => cursor.dictionary().ord_count(),
        }
    }

    /// Returns a fresh cursor over the terms, or `None` for an empty dictionary.
    pub fn terms_enum(&self) -> Option<TermsEnum> {
        match self {
            SortedDocValues::Empty { .. } => None,
            SortedDocValues::Dictionary { cursor, .. } => Some(cursor.dictionary().terms_enum()),
        }
    }

    /// Bytes of the value of document `doc`, or `None` if it has no value.
    pub fn get(&mut self, doc: u32) -> Result<Option<&[u8]>> {
        let ord = self.ord(doc);
        if ord < 0 {
            return Ok(None);
        }
        self.lookup_ord(ord).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use docvalues_bits::packed;
    use docvalues_io::{DataInput, DataOutput};

    use crate::read::{
        catalog::{NumericEncoding, NumericEntry},
        dictionary::tests::dictionary,
    };

    use super::*;

    /// Ordinals stored as a table column, `-1` included.
    fn ords(values: &[i64]) -> Arc<NumericDocValues> {
        let mut table: Vec<i64> = values.to_vec();
        table.sort_unstable();
        table.dedup();
        let mut buf: Vec<u8> = Vec::new();
        buf.write_vint(table.len() as i32);
        for &v in &table {
            buf.write_i64(v);
        }
        let bits = packed::bits_required(table.len() as u64 - 1);
        buf.write_vint(bits as i32);
        let ords: Vec<u64> = values
            .iter()
            .map(|v| table.binary_search(v).unwrap() as u64)
            .collect();
        packed::encode(&mut buf, packed::VERSION_CURRENT, &ords, bits);
        let entry = NumericEntry {
            offset: 0,
            missing_offset: None,
            missing_bytes: 0,
            encoding: NumericEncoding::Table,
            packed_version: Some(packed::VERSION_CURRENT),
        };
        let mut input = DataInput::new(Arc::new(buf), "ords").unwrap();
        Arc::new(NumericDocValues::load(&mut input, &entry, values.len() as u32).unwrap())
    }

    #[test]
    fn test_sorted_view() {
        let dict = dictionary(&[b"blue", b"green", b"red"]);
        let mut view = SortedDocValues::new(4, ords(&[2, -1, 0, 2]), dict);
        assert_eq!(view.value_count(), 3);
        assert_eq!(view.ord(0), 2);
        assert_eq!(view.ord(1), -1);
        assert_eq!(view.lookup_ord(2).unwrap(), b"red");
        assert_eq!(view.get(2).unwrap(), Some(&b"blue"[..]));
        assert_eq!(view.get(1).unwrap(), None);
        assert_eq!(view.lookup_term(b"green"), 1);
        assert_eq!(view.lookup_term(b"purple"), -3);
        assert!(view.lookup_ord(3).unwrap_err().is_contract_violation());
        assert!(view.lookup_ord(-1).unwrap_err().is_contract_violation());

        let mut te = view.terms_enum().unwrap();
        assert_eq!(te.next_term().unwrap(), b"blue");
    }

    #[test]
    fn test_empty_view() {
        let mut view = SortedDocValues::Empty { doc_count: 10 };
        assert_eq!(view.doc_count(), 10);
        assert_eq!(view.ord(9), -1);
        assert_eq!(view.value_count(), 0);
        assert_eq!(view.lookup_term(b"x"), -1);
        assert!(view.terms_enum().is_none());
        assert!(view.lookup_ord(0).is_err());
        assert_eq!(view.get(3).unwrap(), None);
    }
}
