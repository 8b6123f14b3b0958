//! Resource-owning replay state.
//!
//! A replay holds at most one open segment file and one mapped term of it,
//! and none at all when its range is empty.
//! Dropping a [`SegmentView`] unmaps the term and closes the file.

use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};

use memmap2::{Mmap, MmapOptions};

use super::ReplayError;
use crate::recording::segment_file_name;

/// Lifecycle of a replay's storage.
#[derive(Debug)]
pub(super) enum ReplayState {
    /// A term of a segment file is mapped and being read.
    Reading(SegmentView),
    /// The range is empty; no storage was opened.
    Drained,
    /// Storage has been released; the reader cannot be polled.
    Closed,
}

/// One open segment file with one term mapped read-only.
#[derive(Debug)]
pub(super) struct SegmentView {
    path: PathBuf,
    file: File,
    term: Mmap,
    segment_index: i32,
    term_start: i32,
}

impl SegmentView {
    /// Open segment `segment_index` of `recording_id` and map the term that
    /// starts `term_start` bytes into it.
    pub(super) fn open(
        archive_dir: &Path,
        recording_id: i64,
        segment_index: i32,
        term_start: i32,
        term_length: i32,
    ) -> Result<Self, ReplayError> {
        let path = archive_dir.join(segment_file_name(recording_id, segment_index));
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ReplayError::StorageNotFound { path });
            }
            Err(source) => return Err(ReplayError::Io { path, source }),
        };
        let term = map_term(&file, &path, term_start, term_length)?;
        Ok(Self {
            path,
            file,
            term,
            segment_index,
            term_start,
        })
    }

    /// Replace the mapped term with the one at `term_start` in the same file.
    ///
    /// The previous mapping stays in place if the new one cannot be made.
    pub(super) fn remap(&mut self, term_start: i32, term_length: i32) -> Result<(), ReplayError> {
        self.term = map_term(&self.file, &self.path, term_start, term_length)?;
        self.term_start = term_start;
        Ok(())
    }

    pub(super) fn term(&self) -> &[u8] { &self.term }

    pub(super) const fn segment_index(&self) -> i32 { self.segment_index }

    pub(super) const fn term_start(&self) -> i32 { self.term_start }
}

fn map_term(
    file: &File,
    path: &Path,
    term_start: i32,
    term_length: i32,
) -> Result<Mmap, ReplayError> {
    let io_error = |source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    };
    let length = file.metadata().map_err(io_error)?.len();
    let offset = u64::from(term_start.unsigned_abs());
    let required = offset + u64::from(term_length.unsigned_abs());
    if length < required {
        return Err(ReplayError::SegmentTruncated {
            path: path.to_path_buf(),
            length,
            required,
        });
    }
    // SAFETY: the map is read-only and covers bytes the file was just checked
    // to contain. Archive segments are never truncated while replayed.
    unsafe {
        MmapOptions::new()
            .offset(offset)
            .len(term_length.unsigned_abs() as usize)
            .map(file)
    }
    .map_err(io_error)
}
