//! Consumer-side reader over memory-resident terms being written live.
//!
//! [`LiveFragmentReader`] resumes from the position published in a shared
//! [`SubscriberPosition`], walks the term selected by that position and hands
//! every non-padding frame to a [`FragmentHandler`]. Term rotation is implicit:
//! once a term is consumed the published position addresses offset zero of the
//! next term, whose partition is selected on the following poll.

use std::sync::Arc;

use crate::{
    fragment::{Fragment, FragmentHandler},
    frame::{FrameError, FrameHeader, HEADER_LENGTH, check_frame_length, is_aligned},
    metrics::{self, Mode},
    position::SubscriberPosition,
    term::{LogBuffers, TermCursor},
};

/// Reader for one subscriber of one live stream.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use termframe::{
///     fragment::Fragment,
///     live::LiveFragmentReader,
///     position::SubscriberPosition,
///     term::LogBuffers,
/// };
///
/// let log = Arc::new(LogBuffers::new(64 * 1024, 0).expect("valid term length"));
/// let position = Arc::new(SubscriberPosition::new(0, 0));
/// let mut reader = LiveFragmentReader::new(200, 1, 0, Arc::clone(&position), log);
///
/// let mut handler = |_: &Fragment<'_>| {};
/// assert_eq!(reader.poll(&mut handler, 10).expect("empty log is readable"), 0);
/// assert_eq!(position.get(), 0);
/// ```
#[derive(Debug)]
pub struct LiveFragmentReader {
    session_id: i32,
    correlation_id: i64,
    subscriber_position: Arc<SubscriberPosition>,
    log: Arc<LogBuffers>,
    scratch: Vec<u8>,
}

impl LiveFragmentReader {
    /// Start reading `log` at `initial_position`.
    ///
    /// `initial_position` is published to `subscriber_position` immediately.
    #[must_use]
    pub fn new(
        session_id: i32,
        correlation_id: i64,
        initial_position: i64,
        subscriber_position: Arc<SubscriberPosition>,
        log: Arc<LogBuffers>,
    ) -> Self {
        subscriber_position.set_ordered(initial_position);
        Self {
            session_id,
            correlation_id,
            subscriber_position,
            log,
            scratch: Vec::new(),
        }
    }

    /// Session this reader consumes.
    #[must_use]
    pub fn session_id(&self) -> i32 { self.session_id }

    /// Correlation id of the registration that created the reader.
    #[must_use]
    pub fn correlation_id(&self) -> i64 { self.correlation_id }

    /// Last published position.
    #[must_use]
    pub fn position(&self) -> i64 { self.subscriber_position.get() }

    /// Deliver up to `fragment_limit` fragments to `handler`.
    ///
    /// Reading stops at the first frame the producer has not yet published,
    /// at the end of the current term or once the limit is reached. The
    /// position is published exactly once per call and covers every frame
    /// that was read, including padding and including a frame whose handler
    /// panicked.
    ///
    /// Returns the number of non-padding fragments delivered.
    ///
    /// # Errors
    ///
    /// Returns a [`FrameError`] when the term holds a corrupt frame. The
    /// position stays at the start of that frame and the stream cannot be
    /// read any further. [`FrameError::Misaligned`] is returned, and nothing
    /// is published, when the shared position does not fall on a frame
    /// boundary.
    pub fn poll<H>(&mut self, handler: &mut H, fragment_limit: usize) -> Result<usize, FrameError>
    where
        H: FragmentHandler + ?Sized,
    {
        let codec = self.log.codec();
        let start = TermCursor::at_position(codec, self.subscriber_position.get());
        if !is_aligned(start.term_offset()) {
            log::warn!(
                "session {}: position {} is not on a frame boundary",
                self.session_id,
                start.position()
            );
            return Err(FrameError::Misaligned {
                term_offset: start.term_offset(),
            });
        }
        let term = self.log.term_for(start.term_id());
        let mut progress = PublishOnDrop {
            counter: &self.subscriber_position,
            cursor: start,
        };
        let mut fragments_read = 0;

        while fragments_read < fragment_limit && !progress.cursor.at_end_of_term() {
            let frame_offset = progress.cursor.term_offset();
            let frame_length = term.get_i32_volatile(frame_offset);
            if frame_length == 0 {
                break;
            }
            let frame_length = check_frame_length(frame_length, frame_offset, term.capacity())
                .inspect_err(|err| {
                    log::warn!(
                        "session {}: {err}; stream unreadable past position {}",
                        self.session_id,
                        progress.cursor.position()
                    );
                })?;

            let mut raw = [0u8; HEADER_LENGTH];
            term.get_bytes(frame_offset, &mut raw);
            let header = FrameHeader::decode(&raw);
            progress.cursor.advance(header.aligned_length());

            if header.is_padding() {
                metrics::inc_padding();
                continue;
            }

            let payload_offset = FrameHeader::payload_offset(frame_offset);
            self.scratch.resize(frame_length - HEADER_LENGTH, 0);
            term.get_bytes(payload_offset, &mut self.scratch);
            handler.on_fragment(&Fragment::new(&self.scratch, payload_offset, header));
            fragments_read += 1;
        }

        metrics::inc_fragments(Mode::Live, fragments_read);
        Ok(fragments_read)
    }
}

/// Publishes the cursor when a poll ends, however it ends.
struct PublishOnDrop<'a> {
    counter: &'a SubscriberPosition,
    cursor: TermCursor,
}

impl Drop for PublishOnDrop<'_> {
    fn drop(&mut self) { self.counter.set_ordered(self.cursor.position()); }
}
