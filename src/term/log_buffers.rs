//! Pre-allocated partitions of a live log.

use super::TermBuffer;
use crate::position::{ConfigurationError, PARTITION_COUNT, PositionCodec};

/// The [`PARTITION_COUNT`] term buffers backing one live stream.
///
/// Terms rotate implicitly: term id `t` always lives in partition
/// `index_by_term(initial_term_id, t)`, so the previous, current and next
/// terms are resident at the same time.
#[derive(Debug)]
pub struct LogBuffers {
    codec: PositionCodec,
    partitions: [TermBuffer; PARTITION_COUNT],
}

impl LogBuffers {
    /// Allocate zeroed partitions of `term_length` bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if `term_length` is not a supported
    /// power of two.
    pub fn new(term_length: i32, initial_term_id: i32) -> Result<Self, ConfigurationError> {
        let codec = PositionCodec::new(term_length, initial_term_id)?;
        let capacity = term_length as usize;
        Ok(Self {
            codec,
            partitions: std::array::from_fn(|_| TermBuffer::new(capacity)),
        })
    }

    /// Position geometry of the stream.
    #[must_use]
    pub fn codec(&self) -> PositionCodec { self.codec }

    /// Length of each term.
    #[must_use]
    pub fn term_length(&self) -> usize { self.codec.term_length() as usize }

    /// Partition at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= PARTITION_COUNT`.
    #[must_use]
    pub fn partition(&self, index: usize) -> &TermBuffer { &self.partitions[index] }

    /// Partition currently holding `term_id`.
    #[must_use]
    pub fn term_for(&self, term_id: i32) -> &TermBuffer {
        &self.partitions[self.codec.index_by_term(term_id)]
    }
}
