//! Fragments delivered to consumers and the handlers that receive them.
//!
//! A fragment is the payload of one non-padding frame together with its
//! header. Readers lend fragments to a handler for the duration of a single
//! call; nothing is retained once the handler returns.

pub mod handler;
pub mod view;

pub use handler::{ControlledFragmentHandler, FragmentHandler};
pub use view::Fragment;
