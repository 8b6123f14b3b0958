//! Producer-side helpers for live term buffers.

use std::sync::Arc;

use termframe::{
    FrameHeader,
    frame::{HEADER_LENGTH, align},
    term::{LogBuffers, TermBuffer},
};

/// Write `header` and `payload` at `offset`, publishing the frame length last.
///
/// Returns the aligned length of the frame.
pub fn publish_frame(
    term: &TermBuffer,
    offset: usize,
    header: FrameHeader,
    payload: &[u8],
) -> usize {
    let raw = header.to_bytes();
    term.put_bytes(offset + 4, &raw[4..]);
    term.put_bytes(offset + HEADER_LENGTH, payload);
    term.put_i32_ordered(offset, header.frame_length());
    header.aligned_length()
}

/// Appends unfragmented data frames to a live log.
///
/// When a frame does not fit in the rest of the current term, the tail is
/// filled with padding and the frame goes at the start of the next term.
/// Partitions are recycled as terms rotate, so readers must stay within one
/// term of the appender.
///
/// ```rust
/// use std::sync::Arc;
///
/// use termframe::term::LogBuffers;
/// use termframe_testing::TermAppender;
///
/// let log = Arc::new(LogBuffers::new(64 * 1024, 5).expect("valid log"));
/// let mut appender = TermAppender::new(Arc::clone(&log), 1, 2, 5, 0);
/// assert_eq!(appender.append(&[0; 17]), 64);
/// assert_eq!(appender.position(), 64);
/// ```
#[derive(Debug)]
pub struct TermAppender {
    log: Arc<LogBuffers>,
    session_id: i32,
    stream_id: i32,
    term_id: i32,
    term_offset: usize,
}

impl TermAppender {
    /// Start appending to `log` at `term_offset` of `term_id`.
    #[must_use]
    pub fn new(
        log: Arc<LogBuffers>,
        session_id: i32,
        stream_id: i32,
        term_id: i32,
        term_offset: usize,
    ) -> Self {
        Self {
            log,
            session_id,
            stream_id,
            term_id,
            term_offset,
        }
    }

    /// Term currently being appended to.
    #[must_use]
    pub fn term_id(&self) -> i32 { self.term_id }

    /// Absolute position of the next frame.
    #[must_use]
    pub fn position(&self) -> i64 {
        self.log
            .codec()
            .position(self.term_id, self.term_offset as i32)
    }

    /// Append one data frame carrying `payload`.
    ///
    /// Returns the position just past the new frame.
    ///
    /// # Panics
    ///
    /// Panics if the frame cannot fit in an empty term.
    pub fn append(&mut self, payload: &[u8]) -> i64 {
        let needed = align(HEADER_LENGTH + payload.len());
        assert!(
            needed <= self.log.term_length(),
            "frame of {needed} bytes cannot fit a term"
        );
        if self.term_offset + needed > self.log.term_length() {
            self.pad_to_end_of_term();
        }
        let header = FrameHeader::data(
            self.term_id,
            self.term_offset as i32,
            self.session_id,
            self.stream_id,
            payload.len() as i32,
        );
        self.publish(header, payload);
        self.position()
    }

    /// Fill the rest of the current term with one padding frame and move to
    /// the next term.
    ///
    /// Does nothing at the start of a term.
    pub fn pad_to_end_of_term(&mut self) {
        if self.term_offset == 0 {
            return;
        }
        let header = FrameHeader::padding(
            self.term_id,
            self.term_offset as i32,
            self.session_id,
            self.stream_id,
            (self.log.term_length() - self.term_offset) as i32,
        );
        self.publish(header, &[]);
    }

    /// Publish one frame at the cursor. A frame completing the term clears
    /// the next term's partition before it becomes visible.
    fn publish(&mut self, header: FrameHeader, payload: &[u8]) {
        let end = self.term_offset + header.aligned_length();
        let completes_term = end == self.log.term_length();
        if completes_term {
            self.log.term_for(self.term_id.wrapping_add(1)).clear();
        }
        publish_frame(self.log.term_for(self.term_id), self.term_offset, header, payload);
        if completes_term {
            self.term_id = self.term_id.wrapping_add(1);
            self.term_offset = 0;
        } else {
            self.term_offset = end;
        }
    }
}
