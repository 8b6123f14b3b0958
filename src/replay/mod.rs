//! File-backed reader replaying a recorded stream.
//!
//! [`ReplayFragmentReader`] walks the terms of a recording one mapped term at
//! a time, moving to the next term and, when a segment file is exhausted, to
//! the next segment file. Handlers decide per fragment whether to accept it;
//! a refused fragment is offered again by the next poll.

mod error;
mod view;

use std::path::{Path, PathBuf};

pub use error::ReplayError;
use view::{ReplayState, SegmentView};

use crate::{
    fragment::{ControlledFragmentHandler, Fragment},
    frame::{FRAME_ALIGNMENT, FrameHeader, is_aligned},
    metrics::{self, Mode},
    position::PositionCodec,
    recording::{
        RecordingDescriptor,
        TermRotation,
        next_term_start,
        offset_in_segment_file,
        segment_file_index,
    },
    term::TermCursor,
};

/// Part of a recording to replay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayRange {
    /// Term holding the first frame to replay.
    pub term_id: i32,
    /// Frame-aligned offset of the first frame within `term_id`.
    pub term_offset: i32,
    /// Number of bytes to replay, a multiple of
    /// [`FRAME_ALIGNMENT`](crate::frame::FRAME_ALIGNMENT).
    pub length: i64,
}

impl ReplayRange {
    /// Everything `descriptor` records.
    #[must_use]
    pub const fn whole(descriptor: &RecordingDescriptor) -> Self {
        Self {
            term_id: descriptor.initial_term_id,
            term_offset: descriptor.initial_term_offset,
            length: descriptor.length,
        }
    }
}

/// Reader replaying one recording.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// use termframe::{fragment::Fragment, replay::ReplayFragmentReader};
///
/// # fn main() -> Result<(), termframe::replay::ReplayError> {
/// let mut reader = ReplayFragmentReader::open(Path::new("archive"), 7)?;
/// while !reader.is_done() {
///     reader.controlled_poll(
///         &mut |fragment: &Fragment<'_>| {
///             println!("{} bytes", fragment.len());
///             true
///         },
///         10,
///     )?;
/// }
/// reader.close();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ReplayFragmentReader {
    archive_dir: PathBuf,
    descriptor: RecordingDescriptor,
    cursor: TermCursor,
    replay_length: i64,
    transmitted: i64,
    state: ReplayState,
}

impl ReplayFragmentReader {
    /// Replay everything recorded under `recording_id`.
    ///
    /// # Errors
    ///
    /// Returns a [`ReplayError`] if the descriptor cannot be read or is
    /// invalid, or if the first segment file cannot be mapped.
    pub fn open(archive_dir: &Path, recording_id: i64) -> Result<Self, ReplayError> {
        let descriptor = RecordingDescriptor::load(archive_dir, recording_id)?;
        Self::with_descriptor(archive_dir, descriptor, ReplayRange::whole(&descriptor))
    }

    /// Replay `range` of the recording stored under `recording_id`.
    ///
    /// # Errors
    ///
    /// As for [`open`](Self::open), plus [`ReplayError::InvalidRange`] when
    /// `range` is not inside the recording and
    /// [`ReplayError::MisalignedStart`] when it does not start on a frame
    /// boundary.
    pub fn open_range(
        archive_dir: &Path,
        recording_id: i64,
        range: ReplayRange,
    ) -> Result<Self, ReplayError> {
        let descriptor = RecordingDescriptor::load(archive_dir, recording_id)?;
        Self::with_descriptor(archive_dir, descriptor, range)
    }

    /// Replay `range` of a recording whose descriptor is already loaded.
    ///
    /// # Errors
    ///
    /// As for [`open_range`](Self::open_range).
    pub fn with_descriptor(
        archive_dir: &Path,
        descriptor: RecordingDescriptor,
        range: ReplayRange,
    ) -> Result<Self, ReplayError> {
        let codec = descriptor.validate()?;
        check_range(&codec, &descriptor, range)?;

        let term_length = descriptor.term_buffer_length;
        let segment_index = segment_file_index(
            descriptor.initial_term_id,
            term_length,
            range.term_id,
            descriptor.segment_file_length,
        );
        let term_start = offset_in_segment_file(
            0,
            range.term_id,
            descriptor.initial_term_id,
            term_length,
            descriptor.segment_file_length,
        );
        let state = if range.length == 0 {
            ReplayState::Drained
        } else {
            ReplayState::Reading(SegmentView::open(
                archive_dir,
                descriptor.recording_id,
                segment_index,
                term_start,
                term_length,
            )?)
        };
        tracing::debug!(
            recording_id = descriptor.recording_id,
            segment_index,
            term_id = range.term_id,
            term_offset = range.term_offset,
            length = range.length,
            "replay opened"
        );

        Ok(Self {
            archive_dir: archive_dir.to_path_buf(),
            descriptor,
            cursor: TermCursor::new(
                codec,
                range.term_id,
                range.term_offset.unsigned_abs() as usize,
            ),
            replay_length: range.length,
            transmitted: 0,
            state,
        })
    }

    /// Descriptor of the recording being replayed.
    #[must_use]
    pub const fn descriptor(&self) -> &RecordingDescriptor { &self.descriptor }

    /// Absolute position of the next frame to read.
    #[must_use]
    pub fn position(&self) -> i64 { self.cursor.position() }

    /// Bytes the replay will cover in total.
    #[must_use]
    pub const fn replay_length(&self) -> i64 { self.replay_length }

    /// Bytes consumed so far, padding included.
    #[must_use]
    pub const fn transmitted(&self) -> i64 { self.transmitted }

    /// Whether the whole range has been consumed.
    #[must_use]
    pub const fn is_done(&self) -> bool { self.transmitted >= self.replay_length }

    /// Whether [`close`](Self::close) has released the reader's storage.
    #[must_use]
    pub const fn is_closed(&self) -> bool { matches!(self.state, ReplayState::Closed) }

    /// Offer up to `fragment_limit` fragments to `handler`.
    ///
    /// Reading stops at the end of the current term, once the range is
    /// consumed, once the limit is reached, or when the handler refuses a
    /// fragment. A refused fragment is not consumed and is offered again by
    /// the next call. Padding is consumed without being offered.
    ///
    /// When a poll finishes the current term with data still to replay, the
    /// next term is mapped before returning. If that fails the reader stays on
    /// the exhausted term and the next poll retries the move.
    ///
    /// Returns the number of fragments accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::Closed`] after [`close`](Self::close),
    /// [`ReplayError::Frame`] for a corrupt frame,
    /// [`ReplayError::FrameOverrunsRange`] for a frame that would carry the
    /// replay past its end and a storage error if the next term cannot be
    /// mapped.
    pub fn controlled_poll<H>(
        &mut self,
        handler: &mut H,
        fragment_limit: usize,
    ) -> Result<usize, ReplayError>
    where
        H: ControlledFragmentHandler + ?Sized,
    {
        let view = match &self.state {
            ReplayState::Reading(view) => view,
            ReplayState::Drained => return Ok(0),
            ReplayState::Closed => return Err(ReplayError::Closed),
        };
        if self.is_done() {
            return Ok(0);
        }

        let term = view.term();
        let mut polled = 0;
        while polled < fragment_limit && !self.is_done() && !self.cursor.at_end_of_term() {
            let frame_offset = self.cursor.term_offset();
            let header = FrameHeader::parse(term, frame_offset).inspect_err(|err| {
                log::warn!(
                    "recording {}: {err}; replay unreadable past position {}",
                    self.descriptor.recording_id,
                    self.cursor.position()
                );
            })?;

            let aligned_length = header.aligned_length();
            let remaining = self.replay_length - self.transmitted;
            if aligned_length as i64 > remaining {
                log::warn!(
                    "recording {}: frame of {aligned_length} bytes at position {} passes the \
                     end of the replay",
                    self.descriptor.recording_id,
                    self.cursor.position()
                );
                return Err(ReplayError::FrameOverrunsRange {
                    position: self.cursor.position(),
                    aligned_length,
                    remaining,
                });
            }
            let next_cursor = self.cursor.advanced(aligned_length);
            let next_transmitted = self.transmitted + aligned_length as i64;

            if header.is_padding() {
                self.cursor = next_cursor;
                self.transmitted = next_transmitted;
                metrics::inc_padding();
                continue;
            }

            let payload_offset = FrameHeader::payload_offset(frame_offset);
            let payload = &term[payload_offset..payload_offset + header.payload_length()];
            if !handler.on_fragment(&Fragment::new(payload, payload_offset, header)) {
                metrics::inc_rejections();
                break;
            }
            self.cursor = next_cursor;
            self.transmitted = next_transmitted;
            polled += 1;
        }
        metrics::inc_fragments(Mode::Replay, polled);

        if !self.is_done() && self.cursor.at_end_of_term() {
            self.rotate()?;
        }
        Ok(polled)
    }

    /// Release the mapped term and the open segment file.
    ///
    /// Closing twice is harmless.
    pub fn close(&mut self) {
        let previous = std::mem::replace(&mut self.state, ReplayState::Closed);
        if let ReplayState::Reading(view) = previous {
            tracing::debug!(
                recording_id = self.descriptor.recording_id,
                segment_index = view.segment_index(),
                transmitted = self.transmitted,
                "replay closed"
            );
        }
    }

    fn rotate(&mut self) -> Result<(), ReplayError> {
        let ReplayState::Reading(view) = &mut self.state else {
            return Err(ReplayError::Closed);
        };
        let term_length = self.descriptor.term_buffer_length;
        match next_term_start(
            view.term_start(),
            term_length,
            self.descriptor.segment_file_length,
        ) {
            TermRotation::SameSegment { term_start } => view.remap(term_start, term_length)?,
            TermRotation::NextSegment => {
                let segment_index = view.segment_index() + 1;
                let next = SegmentView::open(
                    &self.archive_dir,
                    self.descriptor.recording_id,
                    segment_index,
                    0,
                    term_length,
                )?;
                self.state = ReplayState::Reading(next);
                metrics::inc_segment_rotations();
                tracing::debug!(
                    recording_id = self.descriptor.recording_id,
                    segment_index,
                    "moved to next segment file"
                );
            }
        }
        self.cursor = self.cursor.next_term();
        Ok(())
    }
}

fn check_range(
    codec: &PositionCodec,
    descriptor: &RecordingDescriptor,
    range: ReplayRange,
) -> Result<(), ReplayError> {
    let start = codec.position(range.term_id, range.term_offset);
    let end = start.saturating_add(range.length);
    let inside_term = (0..codec.term_length()).contains(&range.term_offset);
    if !inside_term
        || range.length < 0
        || range.length % FRAME_ALIGNMENT as i64 != 0
        || start < descriptor.start_position()
        || end > descriptor.stop_position()
    {
        return Err(ReplayError::InvalidRange {
            start,
            end,
            recorded_start: descriptor.start_position(),
            recorded_stop: descriptor.stop_position(),
        });
    }
    if !is_aligned(range.term_offset.unsigned_abs() as usize) {
        return Err(ReplayError::MisalignedStart {
            term_offset: range.term_offset,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests;
