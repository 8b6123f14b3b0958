//! Utilities for exercising `termframe` readers in tests.
//!
//! [`TermAppender`] lays frames into live term buffers the way a producer
//! would, publishing each frame length last. [`RecordingBuilder`] writes a
//! descriptor and segment files into a temporary archive directory.
//!
//! ```rust
//! use termframe_testing::RecordingBuilder;
//!
//! let mut builder = RecordingBuilder::new(1, 64 * 1024, 2, 0);
//! builder.append(b"hello");
//! let recording = builder.build().expect("recording written");
//! assert_eq!(recording.descriptor.length, 64);
//! ```

mod archive;
mod logging;
mod term;

pub use archive::{FramePlacement, RecordingBuilder, TempRecording};
pub use logging::{LoggerHandle, logger};
pub use term::{TermAppender, publish_frame};

/// Result alias for tests that propagate errors with `?`.
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;
