//! Frame header codec.

use super::{
    FrameError,
    FrameFlags,
    FrameType,
    descriptor::{
        CURRENT_VERSION,
        FLAGS_FIELD_OFFSET,
        FRAME_LENGTH_FIELD_OFFSET,
        HEADER_LENGTH,
        RESERVED_VALUE_FIELD_OFFSET,
        SESSION_ID_FIELD_OFFSET,
        STREAM_ID_FIELD_OFFSET,
        TERM_ID_FIELD_OFFSET,
        TERM_OFFSET_FIELD_OFFSET,
        TYPE_FIELD_OFFSET,
        VERSION_FIELD_OFFSET,
        align,
    },
};
use crate::byte_order::{
    read_log_i16,
    read_log_i32,
    read_log_i64,
    write_log_i16,
    write_log_i32,
    write_log_i64,
};

/// Decoded header of one frame.
///
/// Parsing copies the fixed-size header out of the term; the payload stays
/// where it is and is addressed through [`FrameHeader::payload_offset`].
///
/// # Examples
///
/// ```
/// use termframe::frame::{FrameHeader, FrameType, HEADER_LENGTH};
///
/// let header = FrameHeader::data(3, 64, 200, 10, 17);
/// let mut term = vec![0u8; 256];
/// term[64..64 + HEADER_LENGTH].copy_from_slice(&header.to_bytes());
///
/// let parsed = FrameHeader::parse(&term, 64).expect("valid header");
/// assert_eq!(parsed.frame_type(), FrameType::Data);
/// assert_eq!(parsed.payload_length(), 17);
/// assert_eq!(parsed.aligned_length(), 64);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHeader {
    frame_length: i32,
    version: u8,
    flags: FrameFlags,
    frame_type: FrameType,
    term_offset: i32,
    session_id: i32,
    stream_id: i32,
    term_id: i32,
    reserved_value: i64,
}

impl FrameHeader {
    /// Header for an unfragmented data frame carrying `payload_length` bytes.
    #[must_use]
    pub const fn data(
        term_id: i32,
        term_offset: i32,
        session_id: i32,
        stream_id: i32,
        payload_length: i32,
    ) -> Self {
        Self {
            frame_length: HEADER_LENGTH as i32 + payload_length,
            version: CURRENT_VERSION,
            flags: FrameFlags::UNFRAGMENTED,
            frame_type: FrameType::Data,
            term_offset,
            session_id,
            stream_id,
            term_id,
            reserved_value: 0,
        }
    }

    /// Header for a padding frame spanning `frame_length` bytes.
    #[must_use]
    pub const fn padding(
        term_id: i32,
        term_offset: i32,
        session_id: i32,
        stream_id: i32,
        frame_length: i32,
    ) -> Self {
        Self {
            frame_length,
            version: CURRENT_VERSION,
            flags: FrameFlags::UNFRAGMENTED,
            frame_type: FrameType::Padding,
            term_offset,
            session_id,
            stream_id,
            term_id,
            reserved_value: 0,
        }
    }

    /// Replace the flag byte.
    #[must_use]
    pub const fn with_flags(mut self, flags: FrameFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Replace the type tag.
    #[must_use]
    pub const fn with_frame_type(mut self, frame_type: FrameType) -> Self {
        self.frame_type = frame_type;
        self
    }

    /// Replace the reserved value.
    #[must_use]
    pub const fn with_reserved_value(mut self, reserved_value: i64) -> Self {
        self.reserved_value = reserved_value;
        self
    }

    /// Read and validate the header of the frame at `offset` in `term`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Truncated`] if `term` ends inside the header and
    /// any other [`FrameError`] if the stored length cannot describe a frame
    /// within `term`.
    pub fn parse(term: &[u8], offset: usize) -> Result<Self, FrameError> {
        let end = offset.saturating_add(HEADER_LENGTH);
        let Some(bytes) = term.get(offset..end) else {
            return Err(FrameError::Truncated {
                offset,
                have: term.len().saturating_sub(offset),
                need: HEADER_LENGTH,
            });
        };
        let mut raw = [0u8; HEADER_LENGTH];
        raw.copy_from_slice(bytes);
        let header = Self::decode(&raw);
        check_frame_length(header.frame_length, offset, term.len())?;
        Ok(header)
    }

    /// Decode header fields without validating them.
    #[must_use]
    pub fn decode(raw: &[u8; HEADER_LENGTH]) -> Self {
        Self {
            frame_length: read_i32_at(raw, FRAME_LENGTH_FIELD_OFFSET),
            version: raw[VERSION_FIELD_OFFSET],
            flags: FrameFlags::new(raw[FLAGS_FIELD_OFFSET]),
            frame_type: FrameType::from_wire(read_log_i16([
                raw[TYPE_FIELD_OFFSET],
                raw[TYPE_FIELD_OFFSET + 1],
            ]) as u16),
            term_offset: read_i32_at(raw, TERM_OFFSET_FIELD_OFFSET),
            session_id: read_i32_at(raw, SESSION_ID_FIELD_OFFSET),
            stream_id: read_i32_at(raw, STREAM_ID_FIELD_OFFSET),
            term_id: read_i32_at(raw, TERM_ID_FIELD_OFFSET),
            reserved_value: {
                let mut value = [0u8; 8];
                value.copy_from_slice(
                    &raw[RESERVED_VALUE_FIELD_OFFSET..RESERVED_VALUE_FIELD_OFFSET + 8],
                );
                read_log_i64(value)
            },
        }
    }

    /// Encode the header in stored layout.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_LENGTH] {
        let mut raw = [0u8; HEADER_LENGTH];
        put(&mut raw, FRAME_LENGTH_FIELD_OFFSET, &write_log_i32(self.frame_length));
        raw[VERSION_FIELD_OFFSET] = self.version;
        raw[FLAGS_FIELD_OFFSET] = self.flags.bits();
        put(
            &mut raw,
            TYPE_FIELD_OFFSET,
            &write_log_i16(self.frame_type.to_wire() as i16),
        );
        put(&mut raw, TERM_OFFSET_FIELD_OFFSET, &write_log_i32(self.term_offset));
        put(&mut raw, SESSION_ID_FIELD_OFFSET, &write_log_i32(self.session_id));
        put(&mut raw, STREAM_ID_FIELD_OFFSET, &write_log_i32(self.stream_id));
        put(&mut raw, TERM_ID_FIELD_OFFSET, &write_log_i32(self.term_id));
        put(
            &mut raw,
            RESERVED_VALUE_FIELD_OFFSET,
            &write_log_i64(self.reserved_value),
        );
        raw
    }

    /// Total frame length including the header.
    #[must_use]
    pub const fn frame_length(&self) -> i32 { self.frame_length }

    /// Header format version.
    #[must_use]
    pub const fn version(&self) -> u8 { self.version }

    /// Fragmentation flags.
    #[must_use]
    pub const fn flags(&self) -> FrameFlags { self.flags }

    /// Frame type tag.
    #[must_use]
    pub const fn frame_type(&self) -> FrameType { self.frame_type }

    /// Offset of the frame within its term, as recorded by the producer.
    #[must_use]
    pub const fn term_offset(&self) -> i32 { self.term_offset }

    /// Publishing session.
    #[must_use]
    pub const fn session_id(&self) -> i32 { self.session_id }

    /// Stream within the session.
    #[must_use]
    pub const fn stream_id(&self) -> i32 { self.stream_id }

    /// Term the frame was written to.
    #[must_use]
    pub const fn term_id(&self) -> i32 { self.term_id }

    /// Application-defined reserved value.
    #[must_use]
    pub const fn reserved_value(&self) -> i64 { self.reserved_value }

    /// Report whether readers skip this frame.
    #[must_use]
    pub const fn is_padding(&self) -> bool { self.frame_type.is_padding() }

    /// Bytes the frame occupies in its term.
    ///
    /// Only meaningful once the length has been validated.
    #[must_use]
    pub const fn aligned_length(&self) -> usize { align(self.frame_length as usize) }

    /// Length of the payload following the header.
    #[must_use]
    pub const fn payload_length(&self) -> usize {
        (self.frame_length as usize).saturating_sub(HEADER_LENGTH)
    }

    /// Offset of the payload for a frame starting at `frame_offset`.
    #[must_use]
    pub const fn payload_offset(frame_offset: usize) -> usize { frame_offset + HEADER_LENGTH }
}

/// Validate a stored frame length for a frame at `term_offset`.
///
/// Returns the length as `usize` on success.
///
/// # Errors
///
/// Returns [`FrameError::NonPositiveLength`] for lengths `<= 0`,
/// [`FrameError::ShorterThanHeader`] when the header does not fit and
/// [`FrameError::ExceedsTerm`] when the aligned frame overruns the term.
pub fn check_frame_length(
    frame_length: i32,
    term_offset: usize,
    term_length: usize,
) -> Result<usize, FrameError> {
    if frame_length <= 0 {
        return Err(FrameError::NonPositiveLength {
            term_offset,
            frame_length,
        });
    }
    let length = frame_length as usize;
    if length < HEADER_LENGTH {
        return Err(FrameError::ShorterThanHeader {
            term_offset,
            frame_length,
        });
    }
    if term_offset.saturating_add(align(length)) > term_length {
        return Err(FrameError::ExceedsTerm {
            term_offset,
            frame_length,
            term_length,
        });
    }
    Ok(length)
}

fn read_i32_at(raw: &[u8; HEADER_LENGTH], offset: usize) -> i32 {
    read_log_i32([raw[offset], raw[offset + 1], raw[offset + 2], raw[offset + 3]])
}

fn put(raw: &mut [u8; HEADER_LENGTH], offset: usize, bytes: &[u8]) {
    raw[offset..offset + bytes.len()].copy_from_slice(bytes);
}
