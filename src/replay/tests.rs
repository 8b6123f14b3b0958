//! Unit tests for replaying recordings from segment files.

use std::{
    fs,
    panic::{self, AssertUnwindSafe},
};

use rstest::rstest;
use tempfile::TempDir;
use tracing_test::traced_test;

use super::*;
use crate::{
    frame::{FrameError, HEADER_LENGTH, align},
    position::TERM_MIN_LENGTH,
    recording::segment_file_name,
};

const TERM_LENGTH: i32 = TERM_MIN_LENGTH;
const INITIAL_TERM_ID: i32 = 7;
const RECORDING_ID: i64 = 3;
const PAYLOAD: [u8; 17] = [7; 17];
const FRAME: usize = align(HEADER_LENGTH + PAYLOAD.len());

/// Segment files under construction, written out by [`Archive::finish`].
struct Archive {
    descriptor: RecordingDescriptor,
    segments: Vec<Vec<u8>>,
}

impl Archive {
    fn new(terms_per_segment: i32, segment_count: usize) -> Self {
        let segment_file_length = terms_per_segment * TERM_LENGTH;
        Self {
            descriptor: RecordingDescriptor {
                recording_id: RECORDING_ID,
                session_id: 200,
                stream_id: 10,
                term_buffer_length: TERM_LENGTH,
                initial_term_id: INITIAL_TERM_ID,
                initial_term_offset: 0,
                segment_file_length,
                length: 0,
            },
            segments: vec![vec![0; segment_file_length as usize]; segment_count],
        }
    }

    fn put(&mut self, term_id: i32, term_offset: usize, header: FrameHeader, payload: &[u8]) {
        let d = &self.descriptor;
        let segment = segment_file_index(
            d.initial_term_id,
            d.term_buffer_length,
            term_id,
            d.segment_file_length,
        ) as usize;
        let at = offset_in_segment_file(
            term_offset as i32,
            term_id,
            d.initial_term_id,
            d.term_buffer_length,
            d.segment_file_length,
        ) as usize;
        let file = &mut self.segments[segment];
        file[at..at + HEADER_LENGTH].copy_from_slice(&header.to_bytes());
        file[at + HEADER_LENGTH..at + HEADER_LENGTH + payload.len()].copy_from_slice(payload);
    }

    fn data(mut self, term_id: i32, term_offset: usize) -> Self {
        let header = FrameHeader::data(term_id, term_offset as i32, 200, 10, PAYLOAD.len() as i32);
        self.put(term_id, term_offset, header, &PAYLOAD);
        self
    }

    fn padding(mut self, term_id: i32, term_offset: usize, length: usize) -> Self {
        let header = FrameHeader::padding(term_id, term_offset as i32, 200, 10, length as i32);
        self.put(term_id, term_offset, header, &[]);
        self
    }

    fn finish(mut self, length: i64) -> (TempDir, RecordingDescriptor) {
        let dir = TempDir::new().expect("temp dir");
        self.descriptor.length = length;
        self.descriptor.store(dir.path()).expect("store descriptor");
        for (index, bytes) in self.segments.iter().enumerate() {
            let name = segment_file_name(RECORDING_ID, index as i32);
            fs::write(dir.path().join(name), bytes).expect("write segment");
        }
        (dir, self.descriptor)
    }
}

fn collect_all(reader: &mut ReplayFragmentReader) -> Vec<(i32, usize)> {
    let mut seen = Vec::new();
    let mut handler = |fragment: &Fragment<'_>| {
        seen.push((fragment.header().term_id(), fragment.frame_offset()));
        true
    };
    while !reader.is_done() {
        reader.controlled_poll(&mut handler, 10).expect("poll");
    }
    seen
}

#[test]
fn replays_whole_recording_in_order() {
    let (dir, _) = Archive::new(4, 1)
        .data(INITIAL_TERM_ID, 0)
        .data(INITIAL_TERM_ID, FRAME)
        .data(INITIAL_TERM_ID, 2 * FRAME)
        .finish(3 * FRAME as i64);

    let mut reader = ReplayFragmentReader::open(dir.path(), RECORDING_ID).expect("open");
    let mut payloads = Vec::new();
    let mut handler = |fragment: &Fragment<'_>| {
        payloads.push((fragment.offset(), fragment.payload().to_vec()));
        true
    };
    assert_eq!(reader.controlled_poll(&mut handler, 10).expect("poll"), 3);
    assert!(reader.is_done());
    assert_eq!(reader.transmitted(), reader.replay_length());
    assert_eq!(reader.position(), 3 * FRAME as i64);
    assert_eq!(
        payloads,
        (0..3)
            .map(|i| (i * FRAME + HEADER_LENGTH, PAYLOAD.to_vec()))
            .collect::<Vec<_>>()
    );

    let mut accept = |_: &Fragment<'_>| true;
    assert_eq!(reader.controlled_poll(&mut accept, 10).expect("poll"), 0);
}

#[test]
fn refused_fragment_is_offered_again() {
    let (dir, _) = Archive::new(4, 1)
        .data(INITIAL_TERM_ID, 0)
        .data(INITIAL_TERM_ID, FRAME)
        .finish(2 * FRAME as i64);
    let mut reader = ReplayFragmentReader::open(dir.path(), RECORDING_ID).expect("open");

    let mut offers = Vec::new();
    let mut accept_first_only = |fragment: &Fragment<'_>| {
        offers.push(fragment.frame_offset());
        fragment.frame_offset() == 0
    };
    assert_eq!(reader.controlled_poll(&mut accept_first_only, 10).expect("poll"), 1);
    assert_eq!(reader.transmitted(), FRAME as i64);
    assert_eq!(reader.position(), FRAME as i64);
    assert_eq!(offers, vec![0, FRAME]);

    let mut reoffered = Vec::new();
    let mut accept = |fragment: &Fragment<'_>| {
        reoffered.push(fragment.frame_offset());
        true
    };
    assert_eq!(reader.controlled_poll(&mut accept, 10).expect("poll"), 1);
    assert_eq!(reoffered, vec![FRAME]);
    assert!(reader.is_done());
}

#[test]
fn padding_is_consumed_but_never_offered() {
    let (dir, _) = Archive::new(4, 1)
        .padding(INITIAL_TERM_ID, 0, 3 * FRAME)
        .data(INITIAL_TERM_ID, 3 * FRAME)
        .finish(4 * FRAME as i64);
    let mut reader = ReplayFragmentReader::open(dir.path(), RECORDING_ID).expect("open");
    assert_eq!(collect_all(&mut reader), vec![(INITIAL_TERM_ID, 3 * FRAME)]);
    assert_eq!(reader.transmitted(), 4 * FRAME as i64);
}

#[test]
fn fragment_limit_bounds_each_poll() {
    let (dir, _) = Archive::new(4, 1)
        .data(INITIAL_TERM_ID, 0)
        .data(INITIAL_TERM_ID, FRAME)
        .data(INITIAL_TERM_ID, 2 * FRAME)
        .finish(3 * FRAME as i64);
    let mut reader = ReplayFragmentReader::open(dir.path(), RECORDING_ID).expect("open");
    let mut accept = |_: &Fragment<'_>| true;
    assert_eq!(reader.controlled_poll(&mut accept, 2).expect("poll"), 2);
    assert!(!reader.is_done());
    assert_eq!(reader.controlled_poll(&mut accept, 2).expect("poll"), 1);
    assert!(reader.is_done());
}

#[test]
fn crosses_term_boundary_within_segment() {
    let tail = TERM_LENGTH as usize - FRAME;
    let (dir, _) = Archive::new(4, 1)
        .padding(INITIAL_TERM_ID, 0, tail)
        .data(INITIAL_TERM_ID, tail)
        .data(INITIAL_TERM_ID + 1, 0)
        .finish(i64::from(TERM_LENGTH) + FRAME as i64);
    let mut reader = ReplayFragmentReader::open(dir.path(), RECORDING_ID).expect("open");

    let mut accept = |_: &Fragment<'_>| true;
    assert_eq!(reader.controlled_poll(&mut accept, 10).expect("poll"), 1);
    assert_eq!(reader.position(), i64::from(TERM_LENGTH));

    assert_eq!(
        collect_all(&mut reader),
        vec![(INITIAL_TERM_ID + 1, 0)]
    );
    assert_eq!(reader.position(), i64::from(TERM_LENGTH) + FRAME as i64);
}

#[test]
#[traced_test]
fn crosses_segment_file_boundary() {
    let tail = TERM_LENGTH as usize - FRAME;
    let (dir, _) = Archive::new(1, 2)
        .padding(INITIAL_TERM_ID, 0, tail)
        .data(INITIAL_TERM_ID, tail)
        .data(INITIAL_TERM_ID + 1, 0)
        .finish(i64::from(TERM_LENGTH) + FRAME as i64);
    let mut reader = ReplayFragmentReader::open(dir.path(), RECORDING_ID).expect("open");
    assert_eq!(
        collect_all(&mut reader),
        vec![(INITIAL_TERM_ID, tail), (INITIAL_TERM_ID + 1, 0)]
    );
    assert!(logs_contain("moved to next segment file"));
    assert!(logs_contain("segment_index=1"));
}

#[test]
fn missing_next_segment_is_reported_and_retried() {
    let tail = TERM_LENGTH as usize - FRAME;
    let (dir, _) = Archive::new(1, 2)
        .padding(INITIAL_TERM_ID, 0, tail)
        .data(INITIAL_TERM_ID, tail)
        .data(INITIAL_TERM_ID + 1, 0)
        .finish(i64::from(TERM_LENGTH) + FRAME as i64);
    let second = dir.path().join(segment_file_name(RECORDING_ID, 1));
    let parked = dir.path().join("parked");
    fs::rename(&second, &parked).expect("hide segment");

    let mut reader = ReplayFragmentReader::open(dir.path(), RECORDING_ID).expect("open");
    let mut accept = |_: &Fragment<'_>| true;
    let err = reader.controlled_poll(&mut accept, 10).expect_err("segment missing");
    assert!(matches!(err, ReplayError::StorageNotFound { ref path } if *path == second));
    assert_eq!(reader.position(), i64::from(TERM_LENGTH));

    fs::rename(&parked, &second).expect("restore segment");
    assert_eq!(reader.controlled_poll(&mut accept, 10).expect("retry"), 0);
    assert_eq!(reader.controlled_poll(&mut accept, 10).expect("poll"), 1);
    assert!(reader.is_done());
}

#[test]
fn partial_range_starts_mid_recording() {
    let (dir, _) = Archive::new(4, 1)
        .data(INITIAL_TERM_ID, 0)
        .data(INITIAL_TERM_ID, FRAME)
        .data(INITIAL_TERM_ID, 2 * FRAME)
        .finish(3 * FRAME as i64);
    let range = ReplayRange {
        term_id: INITIAL_TERM_ID,
        term_offset: FRAME as i32,
        length: FRAME as i64,
    };
    let mut reader =
        ReplayFragmentReader::open_range(dir.path(), RECORDING_ID, range).expect("open");
    assert_eq!(collect_all(&mut reader), vec![(INITIAL_TERM_ID, FRAME)]);
    assert_eq!(reader.position(), 2 * FRAME as i64);
}

#[rstest]
#[case::before_start(INITIAL_TERM_ID - 1, 0, 32)]
#[case::past_end(INITIAL_TERM_ID, 0, 4 * FRAME as i64)]
#[case::negative_length(INITIAL_TERM_ID, 0, -1)]
#[case::offset_outside_term(INITIAL_TERM_ID, TERM_LENGTH, 0)]
#[case::end_inside_a_frame(INITIAL_TERM_ID, 0, FRAME as i64 - 1)]
fn rejects_ranges_outside_recording(
    #[case] term_id: i32,
    #[case] term_offset: i32,
    #[case] length: i64,
) {
    let (dir, _) = Archive::new(4, 1).data(INITIAL_TERM_ID, 0).finish(3 * FRAME as i64);
    let range = ReplayRange {
        term_id,
        term_offset,
        length,
    };
    let err = ReplayFragmentReader::open_range(dir.path(), RECORDING_ID, range)
        .expect_err("invalid");
    assert!(matches!(err, ReplayError::InvalidRange { .. }), "{err}");
}

#[test]
fn frame_longer_than_the_rest_of_the_range_is_not_delivered() {
    let (dir, _) = Archive::new(4, 1)
        .data(INITIAL_TERM_ID, 0)
        .data(INITIAL_TERM_ID, FRAME)
        .finish(2 * FRAME as i64);
    let range = ReplayRange {
        term_id: INITIAL_TERM_ID,
        term_offset: 0,
        length: (FRAME + FRAME / 2) as i64,
    };
    let mut reader =
        ReplayFragmentReader::open_range(dir.path(), RECORDING_ID, range).expect("open");

    let mut offered = Vec::new();
    let mut accept = |fragment: &Fragment<'_>| {
        offered.push(fragment.frame_offset());
        true
    };
    let err = reader.controlled_poll(&mut accept, 10).expect_err("frame overruns range");
    assert!(matches!(
        err,
        ReplayError::FrameOverrunsRange {
            position,
            aligned_length: FRAME,
            remaining,
        } if position == FRAME as i64 && remaining == (FRAME / 2) as i64
    ));
    assert_eq!(offered, vec![0]);
    assert_eq!(reader.transmitted(), FRAME as i64);
    assert!(!reader.is_done());
}

#[test]
fn empty_range_at_segment_end_needs_no_further_segment() {
    let (dir, descriptor) = Archive::new(1, 1)
        .padding(INITIAL_TERM_ID, 0, TERM_LENGTH as usize)
        .finish(i64::from(TERM_LENGTH));
    let range = ReplayRange {
        term_id: INITIAL_TERM_ID + 1,
        term_offset: 0,
        length: 0,
    };
    let mut reader =
        ReplayFragmentReader::open_range(dir.path(), RECORDING_ID, range).expect("open");
    assert!(reader.is_done());
    assert_eq!(reader.position(), descriptor.stop_position());

    let mut accept = |_: &Fragment<'_>| true;
    assert_eq!(reader.controlled_poll(&mut accept, 10).expect("poll"), 0);
    reader.close();
    assert!(reader.is_closed());
    assert!(matches!(
        reader.controlled_poll(&mut accept, 10),
        Err(ReplayError::Closed)
    ));
}

#[test]
fn panicking_handler_leaves_the_frame_unconsumed() {
    let (dir, _) = Archive::new(4, 1)
        .data(INITIAL_TERM_ID, 0)
        .data(INITIAL_TERM_ID, FRAME)
        .finish(2 * FRAME as i64);
    let mut reader = ReplayFragmentReader::open(dir.path(), RECORDING_ID).expect("open");

    let mut fail_on_second = |fragment: &Fragment<'_>| {
        assert_eq!(fragment.frame_offset(), 0, "handler failed");
        true
    };
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        reader.controlled_poll(&mut fail_on_second, 10)
    }));
    assert!(outcome.is_err());
    assert_eq!(reader.transmitted(), FRAME as i64);
    assert_eq!(reader.position(), FRAME as i64);

    assert_eq!(collect_all(&mut reader), vec![(INITIAL_TERM_ID, FRAME)]);
    assert!(reader.is_done());
}

#[test]
fn rejects_start_off_frame_boundary() {
    let (dir, _) = Archive::new(4, 1).data(INITIAL_TERM_ID, 0).finish(3 * FRAME as i64);
    let range = ReplayRange {
        term_id: INITIAL_TERM_ID,
        term_offset: 8,
        length: 32,
    };
    let err = ReplayFragmentReader::open_range(dir.path(), RECORDING_ID, range)
        .expect_err("misaligned");
    assert!(matches!(err, ReplayError::MisalignedStart { term_offset: 8 }));
}

#[test]
fn missing_descriptor_fails_open() {
    let dir = TempDir::new().expect("temp dir");
    let err = ReplayFragmentReader::open(dir.path(), RECORDING_ID).expect_err("no recording");
    assert!(matches!(err, ReplayError::Descriptor(_)));
}

#[test]
fn short_segment_file_is_reported() {
    let (dir, _) = Archive::new(4, 1).data(INITIAL_TERM_ID, 0).finish(FRAME as i64);
    let segment = dir.path().join(segment_file_name(RECORDING_ID, 0));
    fs::File::options()
        .write(true)
        .open(&segment)
        .and_then(|file| file.set_len(1024))
        .expect("truncate segment");
    let err = ReplayFragmentReader::open(dir.path(), RECORDING_ID).expect_err("truncated");
    assert!(matches!(
        err,
        ReplayError::SegmentTruncated {
            length: 1024,
            required,
            ..
        } if required == TERM_LENGTH as u64
    ));
}

#[test]
fn zero_length_frame_inside_range_is_corrupt() {
    let (dir, _) = Archive::new(4, 1).data(INITIAL_TERM_ID, 0).finish(2 * FRAME as i64);
    let mut reader = ReplayFragmentReader::open(dir.path(), RECORDING_ID).expect("open");
    let mut accept = |_: &Fragment<'_>| true;
    let err = reader.controlled_poll(&mut accept, 10).expect_err("corrupt");
    assert!(matches!(
        err,
        ReplayError::Frame(FrameError::NonPositiveLength {
            term_offset: FRAME,
            frame_length: 0
        })
    ));
    assert_eq!(reader.transmitted(), FRAME as i64);
}

#[test]
fn closed_reader_refuses_polls() {
    let (dir, _) = Archive::new(4, 1).data(INITIAL_TERM_ID, 0).finish(FRAME as i64);
    let mut reader = ReplayFragmentReader::open(dir.path(), RECORDING_ID).expect("open");
    reader.close();
    reader.close();
    assert!(reader.is_closed());
    let mut accept = |_: &Fragment<'_>| true;
    assert!(matches!(
        reader.controlled_poll(&mut accept, 10),
        Err(ReplayError::Closed)
    ));
}
