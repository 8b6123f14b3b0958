//! Catalog scalars of one recording and their on-disk form.

use std::{
    fs,
    path::{Path, PathBuf},
};

use bincode::{Decode, Encode, config, decode_from_slice, encode_to_vec};

use super::{DescriptorError, descriptor_file_name};
use crate::{
    frame::is_aligned,
    position::{ConfigurationError, PositionCodec},
};

/// Geometry and extent of a recorded stream.
///
/// The descriptor is read once when a replay is opened; nothing in it changes
/// while the recording is being replayed.
///
/// # Examples
///
/// ```
/// use termframe::recording::RecordingDescriptor;
///
/// let descriptor = RecordingDescriptor {
///     recording_id: 1,
///     session_id: 200,
///     stream_id: 10,
///     term_buffer_length: 64 * 1024,
///     initial_term_id: 7,
///     initial_term_offset: 1024,
///     segment_file_length: 4 * 64 * 1024,
///     length: 4096,
/// };
/// let codec = descriptor.validate().expect("valid geometry");
/// assert_eq!(codec.initial_term_id(), 7);
/// assert_eq!(descriptor.start_position(), 1024);
/// assert_eq!(descriptor.stop_position(), 1024 + 4096);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Encode, Decode)]
pub struct RecordingDescriptor {
    pub recording_id: i64,
    pub session_id: i32,
    pub stream_id: i32,
    pub term_buffer_length: i32,
    pub initial_term_id: i32,
    pub initial_term_offset: i32,
    pub segment_file_length: i32,
    /// Bytes recorded from the initial term offset onwards.
    pub length: i64,
}

impl RecordingDescriptor {
    /// Check the geometry and return the position codec it describes.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the term length is unsupported, the
    /// segment length is not a positive multiple of it, or the initial term
    /// offset is not a frame boundary inside the first term.
    pub fn validate(&self) -> Result<PositionCodec, ConfigurationError> {
        let codec = PositionCodec::new(self.term_buffer_length, self.initial_term_id)?;
        if self.segment_file_length <= 0 || self.segment_file_length % self.term_buffer_length != 0
        {
            return Err(ConfigurationError::SegmentLengthNotMultiple {
                segment_file_length: self.segment_file_length,
                term_length: self.term_buffer_length,
            });
        }
        let offset_in_term = (0..self.term_buffer_length).contains(&self.initial_term_offset);
        if !offset_in_term || !is_aligned(self.initial_term_offset as usize) {
            return Err(ConfigurationError::InitialTermOffset {
                initial_term_offset: self.initial_term_offset,
                term_length: self.term_buffer_length,
            });
        }
        Ok(codec)
    }

    /// Absolute position of the first recorded byte.
    #[must_use]
    pub const fn start_position(&self) -> i64 { self.initial_term_offset as i64 }

    /// Absolute position just past the last recorded byte.
    #[must_use]
    pub const fn stop_position(&self) -> i64 { self.start_position() + self.length }

    /// Number of whole terms held by each segment file.
    #[must_use]
    pub const fn terms_per_segment(&self) -> i32 {
        self.segment_file_length / self.term_buffer_length
    }

    /// Path of the descriptor file for `recording_id` under `archive_dir`.
    #[must_use]
    pub fn path(archive_dir: &Path, recording_id: i64) -> PathBuf {
        archive_dir.join(descriptor_file_name(recording_id))
    }

    /// Read the descriptor of `recording_id` from `archive_dir`.
    ///
    /// The descriptor is returned as stored; call [`validate`](Self::validate)
    /// before trusting its geometry.
    ///
    /// # Errors
    ///
    /// Returns a [`DescriptorError`] if the file cannot be read or decoded, or
    /// if it describes a different recording.
    pub fn load(archive_dir: &Path, recording_id: i64) -> Result<Self, DescriptorError> {
        let path = Self::path(archive_dir, recording_id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(source) => return Err(DescriptorError::Io { path, source }),
        };
        let (descriptor, _) = match decode_from_slice::<Self, _>(&bytes, config::standard()) {
            Ok(decoded) => decoded,
            Err(source) => return Err(DescriptorError::Decode { path, source }),
        };
        if descriptor.recording_id != recording_id {
            return Err(DescriptorError::RecordingIdMismatch {
                path,
                expected: recording_id,
                found: descriptor.recording_id,
            });
        }
        Ok(descriptor)
    }

    /// Write the descriptor to `archive_dir`, replacing any previous copy.
    ///
    /// Returns the path written.
    ///
    /// # Errors
    ///
    /// Returns a [`DescriptorError`] if encoding or writing fails.
    pub fn store(&self, archive_dir: &Path) -> Result<PathBuf, DescriptorError> {
        let bytes = encode_to_vec(self, config::standard())?;
        let path = Self::path(archive_dir, self.recording_id);
        match fs::write(&path, bytes) {
            Ok(()) => Ok(path),
            Err(source) => Err(DescriptorError::Io { path, source }),
        }
    }
}
