//! Back-off applied when a replay session makes no progress.

use std::time::Duration;

/// How long a replay session waits after a consumer turns fragments away.
///
/// A refused fragment stays in the recording, so waiting costs nothing but
/// latency. Successive refusals double the wait from `initial_delay` up to
/// `max_delay`; the first accepted fragment drops it back to
/// `initial_delay`. The defaults are 10 ms and 1 s.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackoffConfig {
    /// Wait after the first refused poll.
    pub initial_delay: Duration,
    /// Ceiling for the doubled wait.
    pub max_delay: Duration,
}

/// Shortest wait a session sleeps for.
const MIN_DELAY: Duration = Duration::from_millis(1);

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
        }
    }
}

impl BackoffConfig {
    /// Raise both delays to at least a millisecond and order them.
    ///
    /// A session never spins on a consumer that has no room, and the wait
    /// never shrinks as refusals accumulate.
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use termframe::session::BackoffConfig;
    ///
    /// let config = BackoffConfig {
    ///     initial_delay: Duration::from_millis(40),
    ///     max_delay: Duration::ZERO,
    /// }
    /// .normalized();
    /// assert_eq!(config.initial_delay, Duration::from_millis(1));
    /// assert_eq!(config.max_delay, Duration::from_millis(40));
    /// ```
    #[must_use]
    pub fn normalized(self) -> Self {
        let first = self.initial_delay.max(MIN_DELAY);
        let second = self.max_delay.max(MIN_DELAY);
        Self {
            initial_delay: first.min(second),
            max_delay: first.max(second),
        }
    }
}

/// Running back-off state for one session.
#[derive(Debug)]
pub(super) struct Backoff {
    config: BackoffConfig,
    delay: Duration,
}

impl Backoff {
    pub(super) fn new(config: BackoffConfig) -> Self {
        let config = config.normalized();
        Self {
            config,
            delay: config.initial_delay,
        }
    }

    /// Delay to wait now; the following call returns twice as much.
    pub(super) fn next_delay(&mut self) -> Duration {
        let delay = self.delay;
        self.delay = (delay * 2).min(self.config.max_delay);
        delay
    }

    pub(super) fn reset(&mut self) { self.delay = self.config.initial_delay; }
}
