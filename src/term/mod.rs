//! Terms: the fixed-length rotation unit of the log.
//!
//! [`TermBuffer`] is the memory-resident term a producer publishes frames
//! into, [`LogBuffers`] holds the rotating partitions of a live stream, and
//! [`TermCursor`] tracks where a reader is within the current term.

mod buffer;
mod cursor;
mod log_buffers;

pub use buffer::TermBuffer;
pub use cursor::TermCursor;
pub use log_buffers::LogBuffers;
