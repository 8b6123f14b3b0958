//! On-disk recordings built frame by frame.

use std::{fs, path::Path};

use tempfile::TempDir;
use termframe::{
    FrameHeader,
    RecordingDescriptor,
    byte_order::write_log_i32,
    frame::HEADER_LENGTH,
    recording::{offset_in_segment_file, segment_file_index, segment_file_name},
};

use crate::TestResult;

/// Where an appended frame landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FramePlacement {
    pub term_id: i32,
    pub term_offset: i32,
    /// Absolute position of the frame's first byte.
    pub position: i64,
}

/// A recording written into a temporary archive directory.
///
/// The directory is removed when this value is dropped.
#[derive(Debug)]
pub struct TempRecording {
    pub dir: TempDir,
    pub descriptor: RecordingDescriptor,
}

impl TempRecording {
    /// Archive directory holding the descriptor and segment files.
    #[must_use]
    pub fn path(&self) -> &Path { self.dir.path() }

    /// Path of segment `index` of this recording.
    #[must_use]
    pub fn segment_path(&self, index: i32) -> std::path::PathBuf {
        self.path()
            .join(segment_file_name(self.descriptor.recording_id, index))
    }
}

/// Lays frames into segment images and writes them out as a recording.
///
/// Segment files are always written at their full length, as an archiver
/// pre-sizing its files would.
#[derive(Debug)]
pub struct RecordingBuilder {
    descriptor: RecordingDescriptor,
    segments: Vec<Vec<u8>>,
    term_id: i32,
    term_offset: usize,
}

impl RecordingBuilder {
    /// Start an empty recording at offset zero of `initial_term_id`.
    #[must_use]
    pub fn new(
        recording_id: i64,
        term_buffer_length: i32,
        terms_per_segment: i32,
        initial_term_id: i32,
    ) -> Self {
        Self {
            descriptor: RecordingDescriptor {
                recording_id,
                session_id: 1,
                stream_id: 1,
                term_buffer_length,
                initial_term_id,
                initial_term_offset: 0,
                segment_file_length: term_buffer_length * terms_per_segment,
                length: 0,
            },
            segments: Vec::new(),
            term_id: initial_term_id,
            term_offset: 0,
        }
    }

    /// Begin recording at `initial_term_offset` of the initial term.
    #[must_use]
    pub fn starting_at(mut self, initial_term_offset: i32) -> Self {
        self.descriptor.initial_term_offset = initial_term_offset;
        self.term_offset = initial_term_offset as usize;
        self
    }

    /// Session and stream ids stamped on every frame.
    #[must_use]
    pub fn with_ids(mut self, session_id: i32, stream_id: i32) -> Self {
        self.descriptor.session_id = session_id;
        self.descriptor.stream_id = stream_id;
        self
    }

    /// Bytes recorded so far, padding included.
    #[must_use]
    pub fn length(&self) -> i64 {
        let d = &self.descriptor;
        let start = i64::from(d.initial_term_offset);
        let terms = i64::from(self.term_id.wrapping_sub(d.initial_term_id));
        terms * i64::from(d.term_buffer_length) + self.term_offset as i64 - start
    }

    /// Append a data frame carrying `payload`, padding to the next term first
    /// when it does not fit in the current one.
    pub fn append(&mut self, payload: &[u8]) -> FramePlacement {
        let probe = FrameHeader::data(0, 0, 0, 0, payload.len() as i32);
        if self.term_offset + probe.aligned_length() > self.term_length() {
            self.pad_to_end_of_term();
        }
        let header = FrameHeader::data(
            self.term_id,
            self.term_offset as i32,
            self.descriptor.session_id,
            self.descriptor.stream_id,
            payload.len() as i32,
        );
        self.place(header, payload)
    }

    /// Append a padding frame of `frame_length` bytes.
    pub fn append_padding(&mut self, frame_length: usize) -> FramePlacement {
        let header = FrameHeader::padding(
            self.term_id,
            self.term_offset as i32,
            self.descriptor.session_id,
            self.descriptor.stream_id,
            frame_length as i32,
        );
        self.place(header, &[])
    }

    /// Fill the rest of the current term with padding.
    ///
    /// Does nothing at the start of a term.
    pub fn pad_to_end_of_term(&mut self) {
        if self.term_offset > 0 {
            self.append_padding(self.term_length() - self.term_offset);
        }
    }

    /// Overwrite the stored frame length at a frame already appended.
    pub fn overwrite_frame_length(&mut self, term_id: i32, term_offset: i32, frame_length: i32) {
        let (segment, at) = self.locate(term_id, term_offset);
        self.segments[segment][at..at + 4].copy_from_slice(&write_log_i32(frame_length));
    }

    /// Write the recording under `archive_dir`, returning its descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be written.
    pub fn write_to(mut self, archive_dir: &Path) -> TestResult<RecordingDescriptor> {
        self.descriptor.length = self.length();
        if self.segments.is_empty() {
            let empty = self.empty_segment();
            self.segments.push(empty);
        }
        self.descriptor.store(archive_dir)?;
        for (index, bytes) in self.segments.iter().enumerate() {
            let name = segment_file_name(self.descriptor.recording_id, i32::try_from(index)?);
            fs::write(archive_dir.join(name), bytes)?;
        }
        Ok(self.descriptor)
    }

    /// Write the recording into a fresh temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or a file cannot be created.
    pub fn build(self) -> TestResult<TempRecording> {
        let dir = TempDir::new()?;
        let descriptor = self.write_to(dir.path())?;
        Ok(TempRecording { dir, descriptor })
    }

    fn term_length(&self) -> usize { self.descriptor.term_buffer_length as usize }

    fn empty_segment(&self) -> Vec<u8> { vec![0; self.descriptor.segment_file_length as usize] }

    fn locate(&mut self, term_id: i32, term_offset: i32) -> (usize, usize) {
        let d = self.descriptor;
        let segment = segment_file_index(
            d.initial_term_id,
            d.term_buffer_length,
            term_id,
            d.segment_file_length,
        ) as usize;
        while self.segments.len() <= segment {
            let empty = self.empty_segment();
            self.segments.push(empty);
        }
        let at = offset_in_segment_file(
            term_offset,
            term_id,
            d.initial_term_id,
            d.term_buffer_length,
            d.segment_file_length,
        ) as usize;
        (segment, at)
    }

    fn place(&mut self, header: FrameHeader, payload: &[u8]) -> FramePlacement {
        let placement = FramePlacement {
            term_id: self.term_id,
            term_offset: self.term_offset as i32,
            position: i64::from(self.descriptor.initial_term_offset) + self.length(),
        };
        let (segment, at) = self.locate(self.term_id, placement.term_offset);
        let file = &mut self.segments[segment];
        file[at..at + HEADER_LENGTH].copy_from_slice(&header.to_bytes());
        file[at + HEADER_LENGTH..at + HEADER_LENGTH + payload.len()].copy_from_slice(payload);

        self.term_offset += header.aligned_length();
        if self.term_offset == self.term_length() {
            self.term_id = self.term_id.wrapping_add(1);
            self.term_offset = 0;
        }
        placement
    }
}
