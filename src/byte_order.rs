//! Helpers for the log's explicit little-endian byte order.
//!
//! Every multi-byte header field in a term is stored least significant byte
//! first. These helpers keep Clippy expectations scoped to the conversion
//! points so header code can stay explicit about the log encoding without
//! repeating lint annotations.

/// Serialise an `i16` in log byte order (little-endian).
///
/// # Examples
///
/// ```
/// use termframe::byte_order::write_log_i16;
///
/// assert_eq!(write_log_i16(0x1234), [0x34, 0x12]);
/// ```
#[must_use]
pub fn write_log_i16(value: i16) -> [u8; 2] {
    #[expect(
        clippy::little_endian_bytes,
        reason = "The log stores header fields little-endian."
    )]
    value.to_le_bytes()
}

/// Parse a log-order `i16` from its stored representation.
#[must_use]
pub fn read_log_i16(bytes: [u8; 2]) -> i16 {
    #[expect(
        clippy::little_endian_bytes,
        reason = "The log stores header fields little-endian."
    )]
    i16::from_le_bytes(bytes)
}

/// Serialise an `i32` in log byte order (little-endian).
///
/// # Examples
///
/// ```
/// use termframe::byte_order::write_log_i32;
///
/// assert_eq!(write_log_i32(0x1234_5678), [0x78, 0x56, 0x34, 0x12]);
/// ```
#[must_use]
pub fn write_log_i32(value: i32) -> [u8; 4] {
    #[expect(
        clippy::little_endian_bytes,
        reason = "The log stores header fields little-endian."
    )]
    value.to_le_bytes()
}

/// Parse a log-order `i32` from its stored representation.
///
/// # Examples
///
/// ```
/// use termframe::byte_order::read_log_i32;
///
/// assert_eq!(read_log_i32([0x78, 0x56, 0x34, 0x12]), 0x1234_5678);
/// ```
#[must_use]
pub fn read_log_i32(bytes: [u8; 4]) -> i32 {
    #[expect(
        clippy::little_endian_bytes,
        reason = "The log stores header fields little-endian."
    )]
    i32::from_le_bytes(bytes)
}

/// Serialise an `i64` in log byte order (little-endian).
#[must_use]
pub fn write_log_i64(value: i64) -> [u8; 8] {
    #[expect(
        clippy::little_endian_bytes,
        reason = "The log stores header fields little-endian."
    )]
    value.to_le_bytes()
}

/// Parse a log-order `i64` from its stored representation.
#[must_use]
pub fn read_log_i64(bytes: [u8; 8]) -> i64 {
    #[expect(
        clippy::little_endian_bytes,
        reason = "The log stores header fields little-endian."
    )]
    i64::from_le_bytes(bytes)
}

/// Split a term word into its four stored bytes.
#[must_use]
pub(crate) fn word_to_log_bytes(word: u32) -> [u8; 4] {
    #[expect(
        clippy::little_endian_bytes,
        reason = "Term words hold bytes in log (little-endian) order."
    )]
    word.to_le_bytes()
}

/// Pack four stored bytes into a term word.
#[must_use]
pub(crate) fn log_bytes_to_word(bytes: [u8; 4]) -> u32 {
    #[expect(
        clippy::little_endian_bytes,
        reason = "Term words hold bytes in log (little-endian) order."
    )]
    u32::from_le_bytes(bytes)
}
