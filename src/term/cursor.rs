//! Read cursor within the current term.

use crate::position::PositionCodec;

/// Term id and byte offset a reader will read from next.
///
/// The cursor is a value: [`advanced`](Self::advanced) and
/// [`next_term`](Self::next_term) return the successor state, so a reader can
/// prepare a move, hand the frame to a consumer and only then decide whether
/// to keep it.
///
/// # Examples
///
/// ```
/// use termframe::{position::PositionCodec, term::TermCursor};
///
/// let codec = PositionCodec::new(64 * 1024, 7).expect("valid term length");
/// let cursor = TermCursor::new(codec, 7, 64 * 1024 - 64);
/// let end = cursor.advanced(64);
/// assert!(end.at_end_of_term());
///
/// let next = end.next_term();
/// assert_eq!((next.term_id(), next.term_offset()), (8, 0));
/// assert_eq!(next.position(), end.position());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TermCursor {
    codec: PositionCodec,
    term_id: i32,
    term_offset: usize,
}

impl TermCursor {
    /// Place a cursor at `term_offset` within `term_id`.
    #[must_use]
    pub fn new(codec: PositionCodec, term_id: i32, term_offset: usize) -> Self {
        debug_assert!(term_offset <= codec.term_length() as usize);
        Self {
            codec,
            term_id,
            term_offset,
        }
    }

    /// Place a cursor at an absolute `position`.
    #[must_use]
    pub fn at_position(codec: PositionCodec, position: i64) -> Self {
        Self::new(
            codec,
            codec.term_id(position),
            codec.term_offset(position) as usize,
        )
    }

    /// Current term id.
    #[must_use]
    pub const fn term_id(&self) -> i32 { self.term_id }

    /// Current byte offset within the term.
    #[must_use]
    pub const fn term_offset(&self) -> usize { self.term_offset }

    /// Live partition holding the current term.
    #[must_use]
    pub const fn term_index(&self) -> usize { self.codec.index_by_term(self.term_id) }

    /// Length of every term.
    #[must_use]
    pub const fn term_length(&self) -> usize { self.codec.term_length() as usize }

    /// Absolute position of the cursor.
    #[must_use]
    pub fn position(&self) -> i64 { self.codec.position(self.term_id, self.term_offset as i32) }

    /// Bytes left before the end of the term.
    #[must_use]
    pub const fn remaining(&self) -> usize { self.term_length() - self.term_offset }

    /// Report whether every byte of the term has been consumed.
    #[must_use]
    pub const fn at_end_of_term(&self) -> bool { self.term_offset == self.term_length() }

    /// Cursor moved forward by `aligned_length` bytes.
    #[must_use]
    pub fn advanced(self, aligned_length: usize) -> Self {
        debug_assert!(aligned_length <= self.remaining());
        Self {
            term_offset: self.term_offset + aligned_length,
            ..self
        }
    }

    /// Move forward by `aligned_length` bytes in place.
    pub fn advance(&mut self, aligned_length: usize) { *self = self.advanced(aligned_length); }

    /// Cursor at the start of the following term.
    #[must_use]
    pub fn next_term(self) -> Self {
        Self {
            term_id: self.term_id.wrapping_add(1),
            term_offset: 0,
            ..self
        }
    }
}
