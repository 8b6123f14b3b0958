//! Frame type tags and flag bits.

use derive_more::{Display, From, Into};

/// Type tag carried in every frame header.
///
/// The header format is fixed, so the set of tags is closed: anything the
/// reader does not recognise is preserved as [`FrameType::Extension`] and
/// delivered like data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameType {
    /// Filler rounding out the unused tail of a term. Never delivered.
    Padding,
    /// Application payload.
    Data,
    /// Negative acknowledgement.
    Nak,
    /// Receiver status message.
    StatusMessage,
    /// Error report.
    Error,
    /// Stream setup.
    Setup,
    /// Round-trip time measurement.
    Rttm,
    /// Name resolution.
    Resolution,
    /// Any other tag.
    Extension(u16),
}

impl FrameType {
    /// Decode a stored type tag.
    #[must_use]
    pub const fn from_wire(tag: u16) -> Self {
        match tag {
            0x00 => Self::Padding,
            0x01 => Self::Data,
            0x02 => Self::Nak,
            0x03 => Self::StatusMessage,
            0x04 => Self::Error,
            0x05 => Self::Setup,
            0x06 => Self::Rttm,
            0x07 => Self::Resolution,
            other => Self::Extension(other),
        }
    }

    /// Encode the tag as stored in the header.
    #[must_use]
    pub const fn to_wire(self) -> u16 {
        match self {
            Self::Padding => 0x00,
            Self::Data => 0x01,
            Self::Nak => 0x02,
            Self::StatusMessage => 0x03,
            Self::Error => 0x04,
            Self::Setup => 0x05,
            Self::Rttm => 0x06,
            Self::Resolution => 0x07,
            Self::Extension(other) => other,
        }
    }

    /// Report whether the frame is skipped by readers.
    #[must_use]
    pub const fn is_padding(self) -> bool { matches!(self, Self::Padding) }
}

/// Flag byte of a frame header.
///
/// # Examples
///
/// ```
/// use termframe::frame::FrameFlags;
///
/// assert!(FrameFlags::UNFRAGMENTED.is_unfragmented());
/// assert!(FrameFlags::BEGIN.is_begin());
/// assert!(!FrameFlags::BEGIN.is_end());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, From, Into)]
#[display("{_0:#04x}")]
pub struct FrameFlags(u8);

impl FrameFlags {
    /// First fragment of a message.
    pub const BEGIN: Self = Self(0x80);
    /// Last fragment of a message.
    pub const END: Self = Self(0x40);
    /// A message carried in a single frame.
    pub const UNFRAGMENTED: Self = Self(0x80 | 0x40);

    /// Wrap raw flag bits.
    #[must_use]
    pub const fn new(bits: u8) -> Self { Self(bits) }

    /// Raw flag bits.
    #[must_use]
    pub const fn bits(self) -> u8 { self.0 }

    /// Frame starts a message.
    #[must_use]
    pub const fn is_begin(self) -> bool { self.0 & Self::BEGIN.0 != 0 }

    /// Frame ends a message.
    #[must_use]
    pub const fn is_end(self) -> bool { self.0 & Self::END.0 != 0 }

    /// Frame carries a whole message.
    #[must_use]
    pub const fn is_unfragmented(self) -> bool {
        self.0 & Self::UNFRAGMENTED.0 == Self::UNFRAGMENTED.0
    }
}
