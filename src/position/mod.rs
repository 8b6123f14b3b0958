//! Position arithmetic for the term-rotated log.
//!
//! A position is the absolute byte address of a point in the stream. It is a
//! pure function of the term id, the offset within that term, the term length
//! and the term id the stream started at. The helpers here convert in both
//! directions and select which of the [`PARTITION_COUNT`] live term slots holds
//! a given term.

mod counter;
mod error;

pub use counter::SubscriberPosition;
pub use error::ConfigurationError;

/// Number of term buffers held by a live log: previous, current and next.
pub const PARTITION_COUNT: usize = 3;

/// Smallest supported term length (64 KiB).
pub const TERM_MIN_LENGTH: i32 = 64 * 1024;

/// Largest supported term length (1 GiB).
pub const TERM_MAX_LENGTH: i32 = 1024 * 1024 * 1024;

/// Number of bits a term count is shifted by to form a position.
///
/// # Errors
///
/// Returns [`ConfigurationError::TermLengthNotPowerOfTwo`] or
/// [`ConfigurationError::TermLengthOutOfRange`] when `term_length` cannot
/// address a log.
///
/// # Examples
///
/// ```
/// use termframe::position::position_bits_to_shift;
///
/// assert_eq!(position_bits_to_shift(64 * 1024), Ok(16));
/// assert!(position_bits_to_shift(100_000).is_err());
/// ```
pub fn position_bits_to_shift(term_length: i32) -> Result<u32, ConfigurationError> {
    if !u32::try_from(term_length).is_ok_and(u32::is_power_of_two) {
        return Err(ConfigurationError::TermLengthNotPowerOfTwo { term_length });
    }
    if !(TERM_MIN_LENGTH..=TERM_MAX_LENGTH).contains(&term_length) {
        return Err(ConfigurationError::TermLengthOutOfRange {
            term_length,
            min: TERM_MIN_LENGTH,
            max: TERM_MAX_LENGTH,
        });
    }
    Ok(term_length.trailing_zeros())
}

/// Compute the absolute position of `term_offset` within `active_term_id`.
///
/// The term distance is taken with wrapping 32-bit arithmetic before it is
/// widened, so term ids that rolled over `i32::MAX` still yield increasing
/// positions.
///
/// # Examples
///
/// ```
/// use termframe::position::compute_position;
///
/// assert_eq!(compute_position(7, 96, 16, 5), (2 << 16) + 96);
/// assert_eq!(compute_position(i32::MIN, 0, 16, i32::MAX), 1 << 16);
/// ```
#[must_use]
pub const fn compute_position(
    active_term_id: i32,
    term_offset: i32,
    position_bits_to_shift: u32,
    initial_term_id: i32,
) -> i64 {
    let term_count = active_term_id.wrapping_sub(initial_term_id) as i64;
    (term_count << position_bits_to_shift) + term_offset as i64
}

/// Recover the term id that contains `position`.
#[must_use]
pub const fn compute_term_id_from_position(
    position: i64,
    position_bits_to_shift: u32,
    initial_term_id: i32,
) -> i32 {
    ((position >> position_bits_to_shift) as i32).wrapping_add(initial_term_id)
}

/// Recover the offset within its term that `position` addresses.
#[must_use]
pub const fn compute_term_offset_from_position(position: i64, position_bits_to_shift: u32) -> i32 {
    let mask = (1_i64 << position_bits_to_shift) - 1;
    (position & mask) as i32
}

/// Select the live partition holding `active_term_id`.
///
/// The result is always in `0..PARTITION_COUNT`.
///
/// # Examples
///
/// ```
/// use termframe::position::index_by_term;
///
/// assert_eq!(index_by_term(10, 10), 0);
/// assert_eq!(index_by_term(10, 14), 1);
/// assert_eq!(index_by_term(10, 9), 2);
/// ```
#[must_use]
pub const fn index_by_term(initial_term_id: i32, active_term_id: i32) -> usize {
    let distance = active_term_id.wrapping_sub(initial_term_id) as i64;
    distance.rem_euclid(PARTITION_COUNT as i64) as usize
}

/// Validated term geometry used to translate positions for one stream.
///
/// # Examples
///
/// ```
/// use termframe::position::PositionCodec;
///
/// let codec = PositionCodec::new(64 * 1024, 100).expect("valid term length");
/// let position = codec.position(101, 32);
/// assert_eq!(position, 64 * 1024 + 32);
/// assert_eq!(codec.term_id(position), 101);
/// assert_eq!(codec.term_offset(position), 32);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PositionCodec {
    term_length: i32,
    position_bits_to_shift: u32,
    initial_term_id: i32,
}

impl PositionCodec {
    /// Validate `term_length` and bind it to `initial_term_id`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if `term_length` is not a supported
    /// power of two.
    pub fn new(term_length: i32, initial_term_id: i32) -> Result<Self, ConfigurationError> {
        let position_bits_to_shift = position_bits_to_shift(term_length)?;
        Ok(Self {
            term_length,
            position_bits_to_shift,
            initial_term_id,
        })
    }

    /// Length in bytes of every term.
    #[must_use]
    pub const fn term_length(&self) -> i32 { self.term_length }

    /// `log2(term_length)`.
    #[must_use]
    pub const fn position_bits_to_shift(&self) -> u32 { self.position_bits_to_shift }

    /// Term id the stream started at.
    #[must_use]
    pub const fn initial_term_id(&self) -> i32 { self.initial_term_id }

    /// Absolute position of `term_offset` within `term_id`.
    #[must_use]
    pub const fn position(&self, term_id: i32, term_offset: i32) -> i64 {
        compute_position(
            term_id,
            term_offset,
            self.position_bits_to_shift,
            self.initial_term_id,
        )
    }

    /// Term id containing `position`.
    #[must_use]
    pub const fn term_id(&self, position: i64) -> i32 {
        compute_term_id_from_position(position, self.position_bits_to_shift, self.initial_term_id)
    }

    /// Offset within its term addressed by `position`.
    #[must_use]
    pub const fn term_offset(&self, position: i64) -> i32 {
        compute_term_offset_from_position(position, self.position_bits_to_shift)
    }

    /// Live partition index holding `term_id`.
    #[must_use]
    pub const fn index_by_term(&self, term_id: i32) -> usize {
        index_by_term(self.initial_term_id, term_id)
    }
}
