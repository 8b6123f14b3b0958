//! Unit tests for frame header parsing and alignment.

use proptest::prelude::*;
use rstest::rstest;

use super::*;

const TERM: usize = 1024;

fn term_with(header: FrameHeader, offset: usize) -> Vec<u8> {
    let mut term = vec![0u8; TERM];
    term[offset..offset + HEADER_LENGTH].copy_from_slice(&header.to_bytes());
    term
}

#[test]
fn header_fields_sit_at_fixed_offsets() {
    let header = FrameHeader::data(0x0102_0304, 0x40, 200, 10, 17).with_reserved_value(-1);
    let raw = header.to_bytes();

    assert_eq!(&raw[0..4], &[49, 0, 0, 0], "frame length");
    assert_eq!(raw[4], CURRENT_VERSION, "version");
    assert_eq!(raw[5], FrameFlags::UNFRAGMENTED.bits(), "flags");
    assert_eq!(&raw[6..8], &[1, 0], "type");
    assert_eq!(&raw[8..12], &[0x40, 0, 0, 0], "term offset");
    assert_eq!(&raw[12..16], &[200, 0, 0, 0], "session id");
    assert_eq!(&raw[16..20], &[10, 0, 0, 0], "stream id");
    assert_eq!(&raw[20..24], &[4, 3, 2, 1], "term id");
    assert_eq!(&raw[24..32], &[0xFF; 8], "reserved value");
}

#[test]
fn decode_inverts_encode() {
    let header = FrameHeader::padding(9, 960, 1, 2, 64)
        .with_flags(FrameFlags::BEGIN)
        .with_reserved_value(42);
    assert_eq!(FrameHeader::decode(&header.to_bytes()), header);
}

#[test]
fn parse_reads_header_at_offset() {
    let term = term_with(FrameHeader::data(5, 96, 200, 10, 17), 96);
    let header = FrameHeader::parse(&term, 96).expect("valid frame");

    assert_eq!(header.frame_length(), 49);
    assert_eq!(header.term_offset(), 96);
    assert_eq!(header.term_id(), 5);
    assert_eq!(header.session_id(), 200);
    assert_eq!(header.stream_id(), 10);
    assert_eq!(header.payload_length(), 17);
    assert_eq!(FrameHeader::payload_offset(96), 96 + HEADER_LENGTH);
    assert!(!header.is_padding());
}

#[rstest]
#[case::zero(0)]
#[case::negative(-64)]
fn non_positive_length_is_corrupt(#[case] frame_length: i32) {
    let mut term = vec![0u8; TERM];
    term[..4].copy_from_slice(&crate::byte_order::write_log_i32(frame_length));
    let err = FrameHeader::parse(&term, 0).expect_err("length must be rejected");
    assert_eq!(
        err,
        FrameError::NonPositiveLength {
            term_offset: 0,
            frame_length
        }
    );
}

#[test]
fn length_shorter_than_header_is_corrupt() {
    let term = term_with(FrameHeader::padding(0, 0, 0, 0, 8), 0);
    let err = FrameHeader::parse(&term, 0).expect_err("short frame must be rejected");
    assert!(matches!(err, FrameError::ShorterThanHeader { .. }));
}

#[test]
fn frame_overrunning_term_is_corrupt() {
    let offset = TERM - 64;
    let term = term_with(FrameHeader::data(0, 0, 0, 0, 64), offset);
    let err = FrameHeader::parse(&term, offset).expect_err("overrun must be rejected");
    assert_eq!(err.term_offset(), offset);
    assert!(matches!(err, FrameError::ExceedsTerm { .. }));
}

#[test]
fn header_past_end_of_buffer_is_truncated() {
    let term = vec![0u8; 40];
    let err = FrameHeader::parse(&term, 32).expect_err("no room for header");
    assert_eq!(
        err,
        FrameError::Truncated {
            offset: 32,
            have: 8,
            need: HEADER_LENGTH
        }
    );
}

#[rstest]
#[case(0x00, FrameType::Padding)]
#[case(0x01, FrameType::Data)]
#[case(0x05, FrameType::Setup)]
#[case(0x99, FrameType::Extension(0x99))]
fn type_tags_map_to_closed_variants(#[case] tag: u16, #[case] expected: FrameType) {
    assert_eq!(FrameType::from_wire(tag), expected);
    assert_eq!(expected.to_wire(), tag);
}

#[test]
fn only_padding_is_skipped() {
    assert!(FrameType::Padding.is_padding());
    assert!(!FrameType::Extension(0x42).is_padding());
    assert!(!FrameType::Nak.is_padding());
}

#[test]
fn flags_distinguish_fragment_markers() {
    let end = FrameFlags::END;
    assert!(end.is_end());
    assert!(!end.is_begin());
    assert!(!end.is_unfragmented());
    assert_eq!(FrameFlags::UNFRAGMENTED.to_string(), "0xc0");
}

proptest! {
    #[test]
    fn aligned_length_is_smallest_covering_multiple(length in 1usize..1_000_000) {
        let aligned = align(length);
        prop_assert!(is_aligned(aligned));
        prop_assert!(aligned >= length);
        prop_assert!(aligned - length < FRAME_ALIGNMENT);
    }
}
