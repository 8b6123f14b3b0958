//! Borrowed view of one delivered fragment.

use crate::frame::{FrameHeader, HEADER_LENGTH};

/// Payload of one frame lent to a handler.
///
/// `offset` is where the payload begins within its term, so a fragment read
/// live and the same fragment replayed from a segment file report identical
/// coordinates.
///
/// # Examples
///
/// ```
/// use termframe::{fragment::Fragment, frame::FrameHeader};
///
/// let header = FrameHeader::data(1, 64, 200, 10, 3);
/// let fragment = Fragment::new(b"abc", 96, header);
/// assert_eq!(fragment.len(), 3);
/// assert_eq!(fragment.frame_offset(), 64);
/// assert_eq!(fragment.payload(), b"abc");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Fragment<'a> {
    payload: &'a [u8],
    offset: usize,
    header: FrameHeader,
}

impl<'a> Fragment<'a> {
    /// Wrap `payload` found at `offset` within its term.
    #[must_use]
    pub const fn new(payload: &'a [u8], offset: usize, header: FrameHeader) -> Self {
        Self {
            payload,
            offset,
            header,
        }
    }

    /// Payload bytes.
    #[must_use]
    pub const fn payload(&self) -> &'a [u8] { self.payload }

    /// Offset of the payload within its term.
    #[must_use]
    pub const fn offset(&self) -> usize { self.offset }

    /// Offset of the enclosing frame within its term.
    #[must_use]
    pub const fn frame_offset(&self) -> usize { self.offset - HEADER_LENGTH }

    /// Payload length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize { self.payload.len() }

    /// Report whether the payload is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool { self.payload.is_empty() }

    /// Header of the enclosing frame.
    #[must_use]
    pub const fn header(&self) -> &FrameHeader { &self.header }
}
