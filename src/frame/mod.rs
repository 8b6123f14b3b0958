//! Self-describing frames stored in a term.
//!
//! Every frame begins with a fixed [`HEADER_LENGTH`]-byte header and occupies
//! a multiple of [`FRAME_ALIGNMENT`] bytes. Padding frames fill the tail of a
//! term and are skipped by readers; every other type is delivered.

pub mod descriptor;
pub mod error;
pub mod header;
pub mod kind;

pub use descriptor::{CURRENT_VERSION, FRAME_ALIGNMENT, HEADER_LENGTH, align, is_aligned};
pub use error::FrameError;
pub use header::{FrameHeader, check_frame_length};
pub use kind::{FrameFlags, FrameType};

#[cfg(test)]
mod tests;
