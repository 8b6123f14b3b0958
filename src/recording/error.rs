//! Errors raised while reading or writing recording descriptors.

use std::{io, path::PathBuf};

use thiserror::Error;

/// A descriptor file could not be read or written.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// The descriptor file could not be accessed.
    #[error("descriptor {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The descriptor file does not hold a valid descriptor.
    #[error("descriptor {path} is malformed: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: bincode::error::DecodeError,
    },
    /// The descriptor could not be serialized.
    #[error(transparent)]
    Encode(#[from] bincode::error::EncodeError),
    /// The file holds the descriptor of another recording.
    #[error("descriptor {path} belongs to recording {found}, expected {expected}")]
    RecordingIdMismatch {
        path: PathBuf,
        expected: i64,
        found: i64,
    },
}
