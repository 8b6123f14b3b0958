//! Metric helpers for `termframe`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate. When the
//! `metrics` feature is disabled every helper compiles to a no-op.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking fragments delivered to handlers.
pub const FRAGMENTS_DELIVERED: &str = "termframe_fragments_total";
/// Name of the counter tracking padding frames skipped.
pub const PADDING_SKIPPED: &str = "termframe_padding_skipped_total";
/// Name of the counter tracking fragments refused by controlled handlers.
pub const REPLAY_REJECTIONS: &str = "termframe_replay_rejections_total";
/// Name of the counter tracking segment file rotations during replay.
pub const SEGMENT_ROTATIONS: &str = "termframe_segment_rotations_total";

/// Reader that consumed a fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Memory-resident live term.
    Live,
    /// File-backed recording.
    Replay,
}

impl Mode {
    #[cfg_attr(not(feature = "metrics"), allow(dead_code))]
    fn as_str(self) -> &'static str {
        match self {
            Mode::Live => "live",
            Mode::Replay => "replay",
        }
    }
}

/// Record `count` fragments delivered by `mode`.
pub fn inc_fragments(mode: Mode, count: usize) {
    #[cfg(feature = "metrics")]
    counter!(FRAGMENTS_DELIVERED, "mode" => mode.as_str()).increment(count as u64);
    #[cfg(not(feature = "metrics"))]
    let _ = (mode, count);
}

/// Record a skipped padding frame.
pub fn inc_padding() {
    #[cfg(feature = "metrics")]
    counter!(PADDING_SKIPPED).increment(1);
}

/// Record a fragment refused during a controlled poll.
pub fn inc_rejections() {
    #[cfg(feature = "metrics")]
    counter!(REPLAY_REJECTIONS).increment(1);
}

/// Record a move to the next segment file.
pub fn inc_segment_rotations() {
    #[cfg(feature = "metrics")]
    counter!(SEGMENT_ROTATIONS).increment(1);
}
