// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sequenced records and their on-disk line format

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parsing a record line
#[derive(Debug, Error)]
pub enum RecordParseError {
    #[error("missing sequence number in line: {0:?}")]
    MissingSequence(String),
    #[error("invalid sequence number in line: {0:?}")]
    InvalidSequence(String),
    #[error("record file contains invalid UTF-8")]
    InvalidUtf8,
}

/// A single sequenced record
///
/// Records are immutable once written. The sequence number is assigned by
/// the log at append time and is unique within one log instance, including
/// across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Monotonically increasing sequence number
    pub sequence: u64,
    /// Application payload, opaque to the log
    pub payload: String,
}

impl Record {
    pub fn new(sequence: u64, payload: impl Into<String>) -> Self {
        Self {
            sequence,
            payload: payload.into(),
        }
    }

    /// Render as the on-disk line format: `<sequence> <payload>`
    pub fn to_line(&self) -> String {
        format!("{} {}", self.sequence, self.payload)
    }

    /// Parse from a single line of the record file
    pub fn from_line(line: &str) -> Result<Self, RecordParseError> {
        let (sequence, payload) = match line.split_once(' ') {
            Some((sequence, payload)) => (sequence, payload),
            None => (line, ""),
        };

        if sequence.is_empty() {
            return Err(RecordParseError::MissingSequence(line.to_string()));
        }

        let sequence = sequence
            .parse()
            .map_err(|_| RecordParseError::InvalidSequence(line.to_string()))?;

        Ok(Self {
            sequence,
            payload: payload.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
