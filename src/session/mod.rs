//! Driving a replay into an async consumer.
//!
//! A [`ReplaySession`] polls a [`ReplayFragmentReader`] on a blocking thread
//! and forwards each fragment over a bounded channel. A full channel refuses
//! the fragment, which the reader then offers again after a back-off; this is
//! the only flow control between the archive and the consumer.

mod backoff;
mod registry;

use std::thread;

use bytes::Bytes;
pub use backoff::BackoffConfig;
use backoff::Backoff;
pub use registry::{ReplayRegistry, ReplaySessionId};
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{
    fragment::{ControlledFragmentHandler, Fragment},
    frame::FrameHeader,
    position::{ConfigurationError, PositionCodec},
    replay::{ReplayError, ReplayFragmentReader},
};

/// Fragment copied out of a recording for delivery to another task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayedFragment {
    /// Header of the frame carrying the fragment.
    pub header: FrameHeader,
    /// Payload bytes.
    pub payload: Bytes,
    /// Absolute position just past the frame.
    pub position: i64,
}

/// Tuning for a [`ReplaySession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplaySessionConfig {
    /// Fragments offered per poll.
    pub fragment_limit: usize,
    /// Wait applied when the consumer has no room.
    pub backoff: BackoffConfig,
}

impl Default for ReplaySessionConfig {
    fn default() -> Self {
        Self {
            fragment_limit: 10,
            backoff: BackoffConfig::default(),
        }
    }
}

impl ReplaySessionConfig {
    /// Check the configuration can make progress.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::ZeroFragmentLimit`] when
    /// `fragment_limit` is zero.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.fragment_limit == 0 {
            return Err(ConfigurationError::ZeroFragmentLimit);
        }
        Ok(())
    }
}

/// Why a session stopped without error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// Every byte of the range was delivered.
    Completed,
    /// The session's cancellation token fired.
    Cancelled,
    /// The receiving half of the channel was dropped.
    ReceiverClosed,
}

/// One replay forwarding fragments to a channel.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// use termframe::{
///     replay::ReplayFragmentReader,
///     session::{ReplaySession, ReplaySessionConfig},
/// };
/// use tokio::sync::mpsc;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let reader = ReplayFragmentReader::open(Path::new("archive"), 7)?;
/// let (tx, mut rx) = mpsc::channel(64);
/// let session = ReplaySession::new(
///     reader,
///     tx,
///     ReplaySessionConfig::default(),
///     CancellationToken::new(),
/// )?;
/// let task = session.spawn();
/// while let Some(fragment) = rx.recv().await {
///     println!("{} bytes at {}", fragment.payload.len(), fragment.position);
/// }
/// task.await??;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ReplaySession {
    reader: ReplayFragmentReader,
    codec: PositionCodec,
    sender: mpsc::Sender<ReplayedFragment>,
    config: ReplaySessionConfig,
    shutdown: CancellationToken,
}

impl ReplaySession {
    /// Bind `reader` to `sender`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if `config` is invalid.
    pub fn new(
        reader: ReplayFragmentReader,
        sender: mpsc::Sender<ReplayedFragment>,
        config: ReplaySessionConfig,
        shutdown: CancellationToken,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let codec = reader.descriptor().validate()?;
        Ok(Self {
            reader,
            codec,
            sender,
            config,
            shutdown,
        })
    }

    /// Replay on the current thread until done, cancelled or the receiver is
    /// dropped.
    ///
    /// This blocks; from async code use [`spawn`](Self::spawn). The reader is
    /// closed however the session ends.
    ///
    /// # Errors
    ///
    /// Returns the [`ReplayError`] that stopped the reader.
    pub fn run(mut self) -> Result<SessionEnd, ReplayError> {
        let recording_id = self.reader.descriptor().recording_id;
        tracing::debug!(
            recording_id,
            length = self.reader.replay_length(),
            "replay session started"
        );
        let outcome = self.drive();
        self.reader.close();
        match &outcome {
            Ok(end) => tracing::debug!(
                recording_id,
                ?end,
                transmitted = self.reader.transmitted(),
                "replay session ended"
            ),
            Err(err) => log::warn!("replay of recording {recording_id} failed: {err}"),
        }
        outcome
    }

    /// Run the session on tokio's blocking pool.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<Result<SessionEnd, ReplayError>> {
        tokio::task::spawn_blocking(move || self.run())
    }

    fn drive(&mut self) -> Result<SessionEnd, ReplayError> {
        let mut backoff = Backoff::new(self.config.backoff);
        let mut forwarder = Forwarder {
            sender: &self.sender,
            codec: self.codec,
            receiver_closed: false,
        };
        loop {
            if self.reader.is_done() {
                return Ok(SessionEnd::Completed);
            }
            if self.shutdown.is_cancelled() {
                return Ok(SessionEnd::Cancelled);
            }
            let before = self.reader.transmitted();
            self.reader
                .controlled_poll(&mut forwarder, self.config.fragment_limit)?;
            if forwarder.receiver_closed {
                return Ok(SessionEnd::ReceiverClosed);
            }
            if self.reader.transmitted() == before {
                thread::sleep(backoff.next_delay());
            } else {
                backoff.reset();
            }
        }
    }
}

/// Copies accepted fragments into the channel.
struct Forwarder<'a> {
    sender: &'a mpsc::Sender<ReplayedFragment>,
    codec: PositionCodec,
    receiver_closed: bool,
}

impl ControlledFragmentHandler for Forwarder<'_> {
    fn on_fragment(&mut self, fragment: &Fragment<'_>) -> bool {
        let header = *fragment.header();
        let frame_end = fragment.frame_offset() + header.aligned_length();
        let replayed = ReplayedFragment {
            header,
            payload: Bytes::copy_from_slice(fragment.payload()),
            position: self.codec.position(header.term_id(), frame_end as i32),
        };
        match self.sender.try_send(replayed) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => false,
            Err(TrySendError::Closed(_)) => {
                self.receiver_closed = true;
                false
            }
        }
    }
}
