#![doc(html_root_url = "https://docs.rs/termframe/latest")]
//! Public API for the `termframe` library.
//!
//! This crate reads streams of self-describing frames laid out in fixed-size
//! terms. Live terms are read straight from shared memory while a producer
//! appends to them; recorded terms are replayed from segment files on disk.
//! Both readers translate between term coordinates and absolute stream
//! positions and hand each frame's payload to a caller-supplied handler.

pub mod byte_order;
pub mod fragment;
pub mod frame;
pub mod live;
pub mod metrics;
pub mod position;
pub mod recording;
pub mod replay;
#[cfg(not(loom))]
pub mod session;
pub mod term;

pub use fragment::{ControlledFragmentHandler, Fragment, FragmentHandler};
pub use frame::{FrameError, FrameHeader, FrameType};
pub use live::LiveFragmentReader;
pub use position::{ConfigurationError, PositionCodec, SubscriberPosition};
pub use recording::RecordingDescriptor;
pub use replay::{ReplayError, ReplayFragmentReader, ReplayRange};
