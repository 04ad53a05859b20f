//! Cursor over the terms of a [`Dictionary`].

use std::sync::Arc;

use bytes::Bytes;
use fst::raw::{CompiledAddr, Fst};

use super::dictionary::Dictionary;

/// Outcome of [`TermsEnum::seek_ceil`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekStatus {
    /// Positioned exactly on the target.
    Found,
    /// Positioned on the smallest term greater than the target.
    NotFound,
    /// Every term is smaller than the target; the cursor is exhausted.
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unpositioned,
    Positioned,
    Exhausted,
}

/// One node on the path from the root to the current term.
#[derive(Debug, Clone, Copy)]
struct Frame {
    addr: CompiledAddr,
    /// Output accumulated before entering the node.
    out: u64,
    /// Index of the transition taken out of the node, or `None` when the current
    /// term ends at this node (only ever true for the last frame).
    pos: Option<usize>,
}

/// Explicit traversal stack; `term` holds one byte per frame that has taken a
/// transition.
#[derive(Debug, Default, Clone)]
struct Path {
    frames: Vec<Frame>,
    term: Vec<u8>,
}

impl Path {
    fn clear(&mut self) {
        self.frames.clear();
        self.term.clear();
    }

    /// Descends from `addr` along the first transitions until the first final node,
    /// which is the smallest term in the subtree.
    fn push_first(&mut self, fst: &Fst<Bytes>, mut addr: CompiledAddr, mut out: u64) {
        loop {
            let node = fst.node(addr);
            if node.is_final() || node.is_empty() {
                self.frames.push(Frame {
                    addr,
                    out,
                    pos: None,
                });
                return;
            }
            let t = node.transition(0);
            self.frames.push(Frame {
                addr,
                out,
                pos: Some(0),
            });
            self.term.push(t.inp);
            addr = t.addr;
            out += t.out.value();
        }
    }

    /// Moves to the next term in byte order. Returns `false` once the stack
    /// unwinds past the root.
    fn advance(&mut self, fst: &Fst<Bytes>) -> bool {
        while let Some(top) = self.frames.last_mut() {
            let next = match top.pos {
                None => 0,
                Some(i) => {
                    self.term.pop();
                    i + 1
                }
            };
            let node = fst.node(top.addr);
            if next < node.len() {
                let t = node.transition(next);
                top.pos = Some(next);
                let out = top.out + t.out.value();
                self.term.push(t.inp);
                self.push_first(fst, t.addr, out);
                return true;
            }
            self.frames.pop();
        }
        false
    }

    fn ord(&self, fst: &Fst<Bytes>) -> Option<u64> {
        let top = self.frames.last()?;
        Some(top.out + fst.node(top.addr).final_output().value())
    }
}

/// Ascending `(term, ord)` cursor over a dictionary.
///
/// The cursor starts unpositioned: call [`next_term`](Self::next_term) or one of
/// the seek methods first. Each instance owns its traversal state, so one
/// instance must not be shared between threads; create another one instead.
#[derive(Debug, Clone)]
pub struct TermsEnum {
    dict: Arc<Dictionary>,
    path: Path,
    state: State,
}

impl TermsEnum {
    pub fn new(dict: Arc<Dictionary>) -> TermsEnum {
        TermsEnum {
            dict,
            path: Path::default(),
            state: State::Unpositioned,
        }
    }

    /// Advances to the next term and returns it, or `None` when exhausted.
    pub fn next_term(&mut self) -> Option<&[u8]> {
        let fst = self.dict.fst();
        let positioned = match self.state {
            State::Exhausted => false,
            State::Unpositioned => {
                self.path.clear();
                if fst.is_empty() {
                    false
                } else {
                    self.path.push_first(fst, fst.root().addr(), 0);
                    true
                }
            }
            State::Positioned => self.path.advance(fst),
        };
        self.settle(positioned);
        self.term()
    }

    /// Positions the cursor on the smallest term `>= target`.
    pub fn seek_ceil(&mut self, target: &[u8]) -> SeekStatus {
        let fst = self.dict.fst();
        self.path.clear();
        if fst.is_empty() {
            self.settle(false);
            return SeekStatus::End;
        }

        let mut addr = fst.root().addr();
        let mut out = 0u64;
        for &b in target {
            let node = fst.node(addr);
            if let Some(idx) = node.find_input(b) {
                let t = node.transition(idx);
                self.path.frames.push(Frame {
                    addr,
                    out,
                    pos: Some(idx),
                });
                self.path.term.push(b);
                addr = t.addr;
                out += t.out.value();
                continue;
            }

            // Mismatch: the answer is the first term of the next larger subtree,
            // either below this node or below one of its ancestors.
            match node.transitions().position(|t| t.inp > b) {
                Some(idx) => {
                    let t = node.transition(idx);
                    self.path.frames.push(Frame {
                        addr,
                        out,
                        pos: Some(idx),
                    });
                    self.path.term.push(t.inp);
                    self.path.push_first(fst, t.addr, out + t.out.value());
                    self.settle(true);
                }
                None => {
                    let positioned = self.path.advance(fst);
                    self.settle(positioned);
                    if !positioned {
                        return SeekStatus::End;
                    }
                }
            }
            return SeekStatus::NotFound;
        }

        let node = fst.node(addr);
        if node.is_final() {
            self.path.frames.push(Frame {
                addr,
                out,
                pos: None,
            });
            self.settle(true);
            SeekStatus::Found
        } else {
            self.path.push_first(fst, addr, out);
            self.settle(true);
            SeekStatus::NotFound
        }
    }

    /// Positions the cursor on `target` if present. On `false` the cursor is
    /// positioned on the ceiling term (if any), like [`seek_ceil`](Self::seek_ceil).
    pub fn seek_exact(&mut self, target: &[u8]) -> bool {
        self.seek_ceil(target) == SeekStatus::Found
    }

    /// Positions the cursor on the term with ordinal `ord`. Returns `false` (and
    /// leaves the cursor exhausted) if `ord` is out of range.
    pub fn seek_exact_ord(&mut self, ord: u64) -> bool {
        let fst = self.dict.fst();
        self.path.clear();
        if ord >= self.dict.ord_count() {
            self.settle(false);
            return false;
        }

        let mut addr = fst.root().addr();
        let mut out = 0u64;
        loop {
            let node = fst.node(addr);
            if node.is_final() && out + node.final_output().value() == ord {
                self.path.frames.push(Frame {
                    addr,
                    out,
                    pos: None,
                });
                self.settle(true);
                return true;
            }
            let mut pick = None;
            for (idx, t) in node.transitions().enumerate() {
                if out + t.out.value() > ord {
                    break;
                }
                pick = Some((idx, t));
            }
            let Some((idx, t)) = pick else {
                self.path.clear();
                self.settle(false);
                return false;
            };
            self.path.frames.push(Frame {
                addr,
                out,
                pos: Some(idx),
            });
            self.path.term.push(t.inp);
            addr = t.addr;
            out += t.out.value();
        }
    }

    /// Current term, or `None` when unpositioned or exhausted.
    pub fn term(&self) -> Option<&[u8]> {
        (self.state == State::Positioned).then_some(self.path.term.as_slice())
    }

    /// Ordinal of the current term, or `None` when unpositioned or exhausted.
    pub fn ord(&self) -> Option<u64> {
        if self.state != State::Positioned {
            return None;
        }
        self.path.ord(self.dict.fst())
    }

    pub fn dictionary(&self) -> &Arc<Dictionary> {
        &self.dict
    }

    fn settle(&mut self, positioned: bool) {
        if positioned {
            self.state = State::Positioned;
        } else {
            self.path.clear();
            self.state = State::Exhausted;
        }
    }
}
