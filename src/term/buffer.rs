//! Memory-resident term shared between one producer and one reader.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::byte_order::{log_bytes_to_word, read_log_i32, word_to_log_bytes, write_log_i32};

const WORD: usize = 4;

/// Fixed-capacity term of atomic 32-bit words.
///
/// The publication protocol is write-then-publish: a producer writes the body
/// of a frame (header fields after the length, then the payload) with
/// [`put_bytes`](Self::put_bytes) and finally stores the frame length with
/// [`put_i32_ordered`](Self::put_i32_ordered). A reader that observes a
/// positive length through [`get_i32_volatile`](Self::get_i32_volatile) is
/// therefore guaranteed to see the whole frame.
///
/// # Examples
///
/// ```
/// use termframe::term::TermBuffer;
///
/// let term = TermBuffer::new(64);
/// term.put_bytes(4, b"abc");
/// term.put_i32_ordered(0, 7);
///
/// let mut out = [0u8; 3];
/// term.get_bytes(4, &mut out);
/// assert_eq!(term.get_i32_volatile(0), 7);
/// assert_eq!(&out, b"abc");
/// ```
#[derive(Debug)]
pub struct TermBuffer {
    words: Box<[AtomicU32]>,
}

impl TermBuffer {
    /// Allocate a zeroed term of `capacity` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a multiple of four.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity % WORD == 0, "term capacity must be word aligned");
        let words = (0..capacity / WORD).map(|_| AtomicU32::new(0)).collect();
        Self { words }
    }

    /// Capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize { self.words.len() * WORD }

    /// Load the word-aligned `i32` at `offset` with acquire ordering.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is not word aligned or lies outside the term.
    #[must_use]
    pub fn get_i32_volatile(&self, offset: usize) -> i32 {
        let word = self.word(offset).load(Ordering::Acquire);
        read_log_i32(word_to_log_bytes(word))
    }

    /// Store the word-aligned `i32` at `offset` with release ordering.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is not word aligned or lies outside the term.
    pub fn put_i32_ordered(&self, offset: usize, value: i32) {
        let word = log_bytes_to_word(write_log_i32(value));
        self.word(offset).store(word, Ordering::Release);
    }

    /// Copy `dst.len()` bytes starting at `offset` out of the term.
    ///
    /// Loads are relaxed; call this only after the covering frame length was
    /// observed with [`get_i32_volatile`](Self::get_i32_volatile).
    ///
    /// # Panics
    ///
    /// Panics if the range lies outside the term.
    pub fn get_bytes(&self, offset: usize, dst: &mut [u8]) {
        self.check_range(offset, dst.len());
        let mut cursor = offset;
        for byte in dst.iter_mut() {
            let word = self.words[cursor / WORD].load(Ordering::Relaxed);
            *byte = word_to_log_bytes(word)[cursor % WORD];
            cursor += 1;
        }
    }

    /// Copy `src` into the term starting at `offset`.
    ///
    /// Only the single producer of this term may call this.
    ///
    /// # Panics
    ///
    /// Panics if the range lies outside the term.
    pub fn put_bytes(&self, offset: usize, src: &[u8]) {
        self.check_range(offset, src.len());
        let mut cursor = offset;
        let mut remaining = src;
        while let Some((first, rest)) = remaining.split_first() {
            let slot = &self.words[cursor / WORD];
            let lane = cursor % WORD;
            if lane == 0 && rest.len() >= WORD - 1 {
                let mut bytes = [0u8; WORD];
                bytes.copy_from_slice(&remaining[..WORD]);
                slot.store(log_bytes_to_word(bytes), Ordering::Relaxed);
                remaining = &remaining[WORD..];
                cursor += WORD;
                continue;
            }
            let mut bytes = word_to_log_bytes(slot.load(Ordering::Relaxed));
            bytes[lane] = *first;
            slot.store(log_bytes_to_word(bytes), Ordering::Relaxed);
            remaining = rest;
            cursor += 1;
        }
    }

    /// Zero the whole term so it can hold a new term id.
    pub fn clear(&self) {
        for word in &*self.words {
            word.store(0, Ordering::Relaxed);
        }
    }

    fn word(&self, offset: usize) -> &AtomicU32 {
        assert!(offset % WORD == 0, "offset {offset} is not word aligned");
        &self.words[offset / WORD]
    }

    fn check_range(&self, offset: usize, len: usize) {
        assert!(
            offset
                .checked_add(len)
                .is_some_and(|end| end <= self.capacity()),
            "range {offset}+{len} outside term of {} bytes",
            self.capacity()
        );
    }
}
