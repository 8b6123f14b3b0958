//! Persisted recordings: catalog scalars and segment file addressing.
//!
//! A recording is a sequence of term images spread over fixed-length segment
//! files. Which file holds a term, and where within it, is a pure function of
//! the [`RecordingDescriptor`] and the term id.

mod descriptor;
mod error;
mod segment;

pub use descriptor::RecordingDescriptor;
pub use error::DescriptorError;
pub use segment::{
    TermRotation,
    descriptor_file_name,
    next_term_start,
    offset_in_segment_file,
    segment_file_index,
    segment_file_name,
};
