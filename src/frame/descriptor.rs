//! Fixed layout constants for frames stored in a term.

/// Length in bytes of every frame header.
pub const HEADER_LENGTH: usize = 32;

/// Granularity every frame, data or padding, is rounded up to in a term.
pub const FRAME_ALIGNMENT: usize = 32;

/// Header format version written by current producers.
pub const CURRENT_VERSION: u8 = 0;

pub(crate) const FRAME_LENGTH_FIELD_OFFSET: usize = 0;
pub(crate) const VERSION_FIELD_OFFSET: usize = 4;
pub(crate) const FLAGS_FIELD_OFFSET: usize = 5;
pub(crate) const TYPE_FIELD_OFFSET: usize = 6;
pub(crate) const TERM_OFFSET_FIELD_OFFSET: usize = 8;
pub(crate) const SESSION_ID_FIELD_OFFSET: usize = 12;
pub(crate) const STREAM_ID_FIELD_OFFSET: usize = 16;
pub(crate) const TERM_ID_FIELD_OFFSET: usize = 20;
pub(crate) const RESERVED_VALUE_FIELD_OFFSET: usize = 24;

/// Round `length` up to the next multiple of [`FRAME_ALIGNMENT`].
///
/// # Examples
///
/// ```
/// use termframe::frame::align;
///
/// assert_eq!(align(1), 32);
/// assert_eq!(align(32), 32);
/// assert_eq!(align(17 + 32), 64);
/// ```
#[must_use]
pub const fn align(length: usize) -> usize {
    length.saturating_add(FRAME_ALIGNMENT - 1) & !(FRAME_ALIGNMENT - 1)
}

/// Report whether `offset` sits on a frame boundary.
#[must_use]
pub const fn is_aligned(offset: usize) -> bool { offset & (FRAME_ALIGNMENT - 1) == 0 }
