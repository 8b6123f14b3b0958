//! Errors raised while validating log geometry.

use thiserror::Error;

/// Log geometry that cannot be addressed by positions.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Term length must be a positive power of two.
    #[error("term length {term_length} is not a power of two")]
    TermLengthNotPowerOfTwo { term_length: i32 },
    /// Term length is outside the supported range.
    #[error("term length {term_length} outside {min}..={max}")]
    TermLengthOutOfRange { term_length: i32, min: i32, max: i32 },
    /// Segment files must hold a whole, positive number of terms.
    #[error(
        "segment file length {segment_file_length} is not a multiple of term length \
         {term_length}"
    )]
    SegmentLengthNotMultiple {
        segment_file_length: i32,
        term_length: i32,
    },
    /// The recording starts at an offset that cannot hold a frame.
    #[error("initial term offset {initial_term_offset} invalid for term length {term_length}")]
    InitialTermOffset {
        initial_term_offset: i32,
        term_length: i32,
    },
    /// A poll must be allowed to deliver at least one fragment.
    #[error("fragment limit must be greater than zero")]
    ZeroFragmentLimit,
}
