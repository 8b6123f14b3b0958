//! Errors surfaced while opening or polling a replay.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::{frame::FrameError, position::ConfigurationError, recording::DescriptorError};

/// Fatal replay failure.
///
/// None of these are retried by the reader; the caller decides whether to
/// abandon the session.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The recording descriptor could not be read.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
    /// The recording geometry cannot be addressed.
    #[error("invalid recording geometry: {0}")]
    Configuration(#[from] ConfigurationError),
    /// A stored frame is corrupt.
    #[error(transparent)]
    Frame(#[from] FrameError),
    /// The requested range lies outside what was recorded.
    #[error(
        "replay of positions {start}..{end} is outside recorded positions \
         {recorded_start}..{recorded_stop}"
    )]
    InvalidRange {
        start: i64,
        end: i64,
        recorded_start: i64,
        recorded_stop: i64,
    },
    /// The requested start does not fall on a frame boundary.
    #[error("replay start offset {term_offset} is not frame aligned")]
    MisalignedStart { term_offset: i32 },
    /// A frame would carry the replay past the end of its range.
    #[error(
        "frame of {aligned_length} bytes at position {position} passes the end of the \
         replay, {remaining} bytes remain"
    )]
    FrameOverrunsRange {
        position: i64,
        aligned_length: usize,
        remaining: i64,
    },
    /// An expected segment file is missing.
    #[error("segment file {path} not found")]
    StorageNotFound { path: PathBuf },
    /// A segment file ends before the term being mapped.
    #[error("segment file {path} holds {length} bytes, need {required}")]
    SegmentTruncated {
        path: PathBuf,
        length: u64,
        required: u64,
    },
    /// A segment file could not be opened or mapped.
    #[error("segment file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The reader was polled after being closed.
    #[error("replay reader is closed")]
    Closed,
}
