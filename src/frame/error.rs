//! Errors signalling a corrupted log.
//!
//! Every variant is fatal: once a header cannot be trusted the reader has no
//! way to find the next frame boundary, so the stream is unreadable past the
//! reported offset.

use thiserror::Error;

/// A frame header that cannot describe a valid frame.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// The stored frame length is zero or negative.
    #[error("corrupt log: frame length {frame_length} at term offset {term_offset}")]
    NonPositiveLength { term_offset: usize, frame_length: i32 },
    /// The stored frame length cannot even hold the header.
    #[error(
        "corrupt log: frame length {frame_length} at term offset {term_offset} is shorter \
         than the header"
    )]
    ShorterThanHeader { term_offset: usize, frame_length: i32 },
    /// The frame runs past the end of its term.
    #[error(
        "corrupt log: frame of {frame_length} bytes at term offset {term_offset} exceeds \
         term length {term_length}"
    )]
    ExceedsTerm {
        term_offset: usize,
        frame_length: i32,
        term_length: usize,
    },
    /// A reader was asked to start between frames.
    #[error("term offset {term_offset} is not on a frame boundary")]
    Misaligned { term_offset: usize },
    /// The buffer ends before the header does.
    #[error("truncated header at offset {offset}: have {have} bytes, need {need}")]
    Truncated { offset: usize, have: usize, need: usize },
}

impl FrameError {
    /// Term offset of the offending frame.
    #[must_use]
    pub const fn term_offset(&self) -> usize {
        match *self {
            Self::NonPositiveLength { term_offset, .. }
            | Self::ShorterThanHeader { term_offset, .. }
            | Self::ExceedsTerm { term_offset, .. }
            | Self::Misaligned { term_offset } => term_offset,
            Self::Truncated { offset, .. } => offset,
        }
    }
}
