// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Consumer-offset tracking and the durable offset marker

use kyu_core::fs::{AppendFile, FsAdapter};
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from offset-marker operations
#[derive(Debug, Error)]
pub enum OffsetError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed offset marker line: {0:?}")]
    Malformed(String),
}

/// Contiguous low-water-mark offset tracker
///
/// The offset is the next expected sequence: everything below it has been
/// committed. Commits that arrive ahead of the contiguous run are held in
/// a set until the gap below them fills, so the offset never advances past
/// a sequence that was not actually committed.
#[derive(Debug, Clone, Default)]
pub struct OffsetTracker {
    offset: u64,
    ahead: BTreeSet<u64>,
}

impl OffsetTracker {
    pub fn new(offset: u64) -> Self {
        Self {
            offset,
            ahead: BTreeSet::new(),
        }
    }

    /// Next expected (lowest un-committed) sequence
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Record a committed sequence; returns the new offset if the
    /// contiguous mark advanced
    pub fn record(&mut self, seq: u64) -> Option<u64> {
        if seq < self.offset {
            return None; // duplicate or stale commit
        }
        self.ahead.insert(seq);

        let before = self.offset;
        while self.ahead.remove(&self.offset) {
            self.offset += 1;
        }
        (self.offset != before).then_some(self.offset)
    }

    /// Count of sequences committed ahead of the contiguous run
    pub fn pending_ahead(&self) -> usize {
        self.ahead.len()
    }
}

/// Durable offset marker: one decimal integer per line, append-only; the
/// last line is authoritative on load
pub struct OffsetMarker {
    path: PathBuf,
    file: Box<dyn AppendFile>,
}

impl OffsetMarker {
    /// Open or create the marker file, returning the marker and the
    /// offset loaded from its last line (0 for an empty file)
    pub fn open<F: FsAdapter>(
        fs: &F,
        path: impl Into<PathBuf>,
    ) -> Result<(Self, u64), OffsetError> {
        let path = path.into();
        fs.ensure_file(&path)?;
        let offset = read_last_offset(fs, &path)?;
        let file = Box::new(fs.open_append(&path)?);
        Ok((Self { path, file }, offset))
    }

    /// Append a new offset value; the marker is append-only, so earlier
    /// values remain as history
    pub async fn append(&mut self, offset: u64) -> Result<(), OffsetError> {
        self.file.append(format!("{offset}\n").as_bytes()).await?;
        tracing::trace!(path = %self.path.display(), offset, "persisted offset");
        Ok(())
    }
}

/// Last non-empty line of the marker file, parsed as an offset
fn read_last_offset<F: FsAdapter>(fs: &F, path: &Path) -> Result<u64, OffsetError> {
    let size = fs.size(path)?;
    if size == 0 {
        return Ok(0);
    }

    let bytes = fs.read_at(path, 0, size as usize)?;
    let text = String::from_utf8(bytes)
        .map_err(|_| OffsetError::Malformed("<invalid utf-8>".to_string()))?;

    let Some(line) = text.lines().rev().find(|line| !line.trim().is_empty()) else {
        return Ok(0);
    };
    line.trim()
        .parse()
        .map_err(|_| OffsetError::Malformed(line.to_string()))
}

#[cfg(test)]
#[path = "offset_tests.rs"]
mod tests;
