//! Segment file naming and term placement.

/// File holding the descriptor of `recording_id`.
///
/// # Examples
///
/// ```
/// use termframe::recording::{descriptor_file_name, segment_file_name};
///
/// assert_eq!(descriptor_file_name(7), "7.inf");
/// assert_eq!(segment_file_name(7, 2), "7.2.rec");
/// ```
#[must_use]
pub fn descriptor_file_name(recording_id: i64) -> String { format!("{recording_id}.inf") }

/// File holding segment `segment_index` of `recording_id`.
#[must_use]
pub fn segment_file_name(recording_id: i64, segment_index: i32) -> String {
    format!("{recording_id}.{segment_index}.rec")
}

/// Index of the segment file holding `term_id`.
///
/// `segment_file_length` must be a positive multiple of `term_buffer_length`
/// and `term_id` must not precede `initial_term_id`.
#[must_use]
pub const fn segment_file_index(
    initial_term_id: i32,
    term_buffer_length: i32,
    term_id: i32,
    segment_file_length: i32,
) -> i32 {
    let terms_per_file = segment_file_length / term_buffer_length;
    term_id.wrapping_sub(initial_term_id) / terms_per_file
}

/// Byte offset within its segment file of `term_offset` in `term_id`.
///
/// Terms are stored whole, so the offset of a term's first byte is always a
/// multiple of `term_buffer_length`.
#[must_use]
pub const fn offset_in_segment_file(
    term_offset: i32,
    term_id: i32,
    initial_term_id: i32,
    term_buffer_length: i32,
    segment_file_length: i32,
) -> i32 {
    let terms_per_file = segment_file_length / term_buffer_length;
    let term_slot = term_id.wrapping_sub(initial_term_id) % terms_per_file;
    term_slot * term_buffer_length + term_offset
}

/// Where the term after one starting at some offset lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TermRotation {
    /// Next term starts at `term_start` in the same segment file.
    SameSegment { term_start: i32 },
    /// Current segment file is exhausted; the next term starts at offset zero
    /// of the following segment file.
    NextSegment,
}

/// Decide where the term following the one at `term_start` begins.
///
/// # Examples
///
/// ```
/// use termframe::recording::{TermRotation, next_term_start};
///
/// assert_eq!(
///     next_term_start(0, 1024, 4096),
///     TermRotation::SameSegment { term_start: 1024 }
/// );
/// assert_eq!(next_term_start(3072, 1024, 4096), TermRotation::NextSegment);
/// ```
#[must_use]
pub const fn next_term_start(
    term_start: i32,
    term_buffer_length: i32,
    segment_file_length: i32,
) -> TermRotation {
    let next = term_start + term_buffer_length;
    if next >= segment_file_length {
        TermRotation::NextSegment
    } else {
        TermRotation::SameSegment { term_start: next }
    }
}
