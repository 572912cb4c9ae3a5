// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backward-scan recovery for file-backed logs
//!
//! Reconstructs the pending buffer at startup: scan the record file
//! backward in fixed-size windows from end-of-file until a line with a
//! sequence number at or before the target offset is found, then load
//! from that line forward. Failing to find the target is fatal — starting
//! empty would be indistinguishable from data loss.

use kyu_core::fs::FsAdapter;
use kyu_core::log::LogError;
use kyu_core::record::RecordParseError;
use kyu_core::Record;
use std::path::Path;

/// Bytes per backward-scan window
const SEEK_WINDOW: u64 = 1024;

/// Result of recovering a log file to a target offset
#[derive(Debug)]
pub(crate) struct Recovered {
    /// Records at or after the target offset, in file order
    pub records: Vec<Record>,
    /// One past the highest sequence seen in the file
    pub next_seq: u64,
}

/// Recover the log at `path` to `target`
pub(crate) fn recover<F: FsAdapter>(
    fs: &F,
    path: &Path,
    target: u64,
) -> Result<Recovered, LogError> {
    let size = fs.size(path)?;
    if size == 0 {
        if target == 0 {
            return Ok(Recovered {
                records: Vec::new(),
                next_seq: 0,
            });
        }
        return Err(LogError::OffsetNotFound { offset: target });
    }

    let boundary = find_boundary(fs, path, size, target)?;
    load_from(fs, path, size, boundary, target)
}

/// Locate the byte offset of the latest line whose sequence number is at
/// or before `target`, scanning backward in windows
fn find_boundary<F: FsAdapter>(
    fs: &F,
    path: &Path,
    size: u64,
    target: u64,
) -> Result<u64, LogError> {
    let mut carry: Vec<u8> = Vec::new();
    let mut high = size;

    while high > 0 {
        let low = high.saturating_sub(SEEK_WINDOW);
        let mut window = fs.read_at(path, low, (high - low) as usize)?;
        window.extend_from_slice(&carry);

        // Candidate line starts: after each newline, plus the window start
        // once the scan has reached the beginning of the file. The head
        // segment of an interior window may be a partial line, so it is
        // carried into the next (earlier) window instead.
        let mut starts: Vec<usize> = Vec::new();
        if low == 0 {
            starts.push(0);
        }
        for (i, byte) in window.iter().enumerate() {
            if *byte == b'\n' && i + 1 < window.len() {
                starts.push(i + 1);
            }
        }

        for &start in starts.iter().rev() {
            if let Some(seq) = leading_sequence(line_at(&window, start)) {
                if seq <= target {
                    return Ok(low + start as u64);
                }
            }
        }

        let head_len = window
            .iter()
            .position(|b| *b == b'\n')
            .unwrap_or(window.len());
        carry = window[..head_len].to_vec();
        high = low;
    }

    tracing::debug!(path = %path.display(), target, "resume offset not found after full scan");
    Err(LogError::OffsetNotFound { offset: target })
}

/// The line beginning at `start`, up to the next newline or end of window
fn line_at(window: &[u8], start: usize) -> &[u8] {
    let rest = &window[start..];
    match rest.iter().position(|b| *b == b'\n') {
        Some(end) => &rest[..end],
        None => rest,
    }
}

/// Parse the leading decimal token of a line as a sequence number
fn leading_sequence(line: &[u8]) -> Option<u64> {
    let token = match line.iter().position(|b| *b == b' ') {
        Some(end) => &line[..end],
        None => line,
    };
    std::str::from_utf8(token).ok()?.parse().ok()
}

/// Load every line from `boundary` to end-of-file, keeping records at or
/// after the target offset and tracking the highest sequence seen
fn load_from<F: FsAdapter>(
    fs: &F,
    path: &Path,
    size: u64,
    boundary: u64,
    target: u64,
) -> Result<Recovered, LogError> {
    let bytes = fs.read_at(path, boundary, (size - boundary) as usize)?;
    let text = String::from_utf8(bytes).map_err(|_| RecordParseError::InvalidUtf8)?;

    let mut records = Vec::new();
    let mut highest: Option<u64> = None;
    for line in text.lines() {
        if line.is_empty() {
            continue;
        }
        let record = Record::from_line(line)?;
        highest = Some(highest.map_or(record.sequence, |h| h.max(record.sequence)));
        // records earlier than the target were already committed and must
        // not re-enter the buffer
        if record.sequence >= target {
            records.push(record);
        }
    }

    let next_seq = highest.map_or(0, |h| h + 1);
    Ok(Recovered { records, next_seq })
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
