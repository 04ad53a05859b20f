//! Multi-valued ordered string view.

use std::sync::Arc;

use docvalues_common::{Result, error::Error};

use super::{binary::BinaryDocValues, dictionary::Dictionary, terms_enum::TermsEnum};

/// Returned by [`SortedSetDocValues::next_ord`] once the selected document has no
/// more ordinals.
pub const NO_MORE_ORDS: i64 = -1;

/// Per-document ascending set of ordinals into an ordered dictionary.
///
/// Each document's ordinals are stored as a list of `vlong` deltas. Iteration is
/// stateful: [`set_document`](Self::set_document) selects a document and
/// [`next_ord`](Self::next_ord) walks its ordinals once. Like the sorted view,
/// an instance is owned by a single caller.
#[derive(Debug, Clone)]
pub enum SortedSetDocValues {
    /// The field's dictionary is empty: every document has an empty set.
    Empty { doc_count: u32 },
    Dictionary {
        doc_count: u32,
        lists: Arc<BinaryDocValues>,
        cursor: TermsEnum,
        selection: Option<Selection>,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct Selection {
    doc: u32,
    offset: usize,
    ord: i64,
}

impl SortedSetDocValues {
    pub fn new(doc_count: u32, lists: Arc<BinaryDocValues>, dict: Arc<Dictionary>) -> Self {
        SortedSetDocValues::Dictionary {
            doc_count,
            lists,
            cursor: dict.terms_enum(),
            selection: None,
        }
    }

    pub fn doc_count(&self) -> u32 {
        match self {
            SortedSetDocValues::Empty { doc_count }
            | SortedSetDocValues::Dictionary { doc_count, .. } => *doc_count,
        }
    }

    /// Selects `doc` and rewinds the ordinal iteration.
    pub fn set_document(&mut self, doc: u32) {
        if let SortedSetDocValues::Dictionary { selection, .. } = self {
            *selection = Some(Selection {
                doc,
                offset: 0,
                ord: 0,
            });
        }
    }

    /// Next ordinal of the selected document in ascending order, or
    /// [`NO_MORE_ORDS`].
    pub fn next_ord(&mut self) -> i64 {
        let SortedSetDocValues::Dictionary {
            lists,
            selection: Some(sel),
            ..
        } = self
        else {
            return NO_MORE_ORDS;
        };
        let bytes = lists.get(sel.doc);
        match read_delta(bytes, &mut sel.offset) {
            Some(delta) => {
                sel.ord = sel.ord.wrapping_add(delta);
                sel.ord
            }
            None => NO_MORE_ORDS,
        }
    }

    /// Ordinals of `doc`, independent of the current selection.
    pub fn ords(&self, doc: u32) -> Ords<'_> {
        let bytes = match self {
            SortedSetDocValues::Empty { .. } => &[][..],
            SortedSetDocValues::Dictionary { lists, .. } => lists.get(doc),
        };
        Ords {
            bytes,
            offset: 0,
            ord: 0,
        }
    }

    /// Returns `true` if `doc` has at least one ordinal.
    pub fn has_ords(&self, doc: u32) -> bool {
        match self {
            SortedSetDocValues::Empty { .. } => false,
            SortedSetDocValues::Dictionary { lists, .. } => !lists.get(doc).is_empty(),
        }
    }

    /// Bytes of the term with ordinal `ord`.
    ///
    /// The returned slice is valid until the next call on this view.
    pub fn lookup_ord(&mut self, ord: i64) -> Result<&[u8]> {
        let value_count = self.value_count();
        if let SortedSetDocValues::Dictionary { cursor, .. } = self
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
            SortedSetDocValues::Empty { .. } => -1,
            SortedSetDocValues::Dictionary { cursor, .. } => cursor.dictionary().lookup_term(term),
        }
    }

    pub fn value_count(&self) -> u64 {
        match self {
            SortedSetDocValues::Empty { .. } => 0,
            SortedSetDocValues::Dictionary { cursor, .. } => cursor.dictionary().ord_count(),
        }
    }

    /// Returns a fresh cursor over the terms, or `None` for an empty dictionary.
    pub fn terms_enum(&self) -> Option<TermsEnum> {
        match self {
            SortedSetDocValues::Empty { .. } => None,
            SortedSetDocValues::Dictionary { cursor, .. } => Some(cursor.dictionary().terms_enum()),
        }
    }
}

/// Iterator over the ordinals of one document.
#[derive(Debug, Clone)]
pub struct Ords<'a> {
    bytes: &'a [u8],
    offset: usize,
    ord: i64,
}

impl Iterator for Ords<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let delta = read_delta(self.bytes, &mut self.offset)?;
        self.ord = self.ord.wrapping_add(delta);
        Some(self.ord)
    }
}

/// Decodes one `vlong` of at most 9 bytes at `*offset`. A truncated or overlong
/// trailing value ends the list.
fn read_delta(bytes: &[u8], offset: &mut usize) -> Option<i64> {
    let mut value = 0u64;
    for shift in (0..63).step_by(7) {
        let Some(&b) = bytes.get(*offset) else {
            break;
        };
        *offset += 1;
        value |= ((b & 0x7f) as u64) << shift;
        if b & 0x80 == 0 {
            return Some(value as i64);
        }
    }
    *offset = bytes.len();
    None
}
