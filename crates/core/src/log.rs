// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The log contract: operations and notifications
//!
//! Every log implementation sequences appended lines, buffers them until a
//! consumer acknowledges them, and raises two notifications: `Flushed` once
//! a batch is durably applied and `Committed` for every acknowledgment.
//! Acknowledgment happens through per-record [`CommitHandle`]s, which may
//! be invoked in any order.

use crate::buffer::{self, SharedBuffer};
use crate::record::{Record, RecordParseError};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

/// Capacity of the notification channels
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Create a notification channel with the standard capacity
pub fn event_channel<T: Clone>() -> broadcast::Sender<T> {
    broadcast::channel(EVENT_CHANNEL_CAPACITY).0
}

/// Errors from log operations
#[derive(Debug, Error)]
pub enum LogError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed record: {0}")]
    Parse(#[from] RecordParseError),
    #[error("resume offset {offset} not found in log file")]
    OffsetNotFound { offset: u64 },
    #[error("log is closed")]
    Closed,
}

/// Notifications raised by a log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    /// A batch was durably applied; carries the highest new sequence
    Flushed { last_seq: u64 },
    /// A record was acknowledged
    Committed { seq: u64 },
}

/// A pending record paired with its commit handle
#[derive(Debug)]
pub struct LogRecord {
    record: Record,
    handle: CommitHandle,
}

impl LogRecord {
    pub fn new(record: Record, handle: CommitHandle) -> Self {
        Self { record, handle }
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn sequence(&self) -> u64 {
        self.record.sequence
    }

    pub fn payload(&self) -> &str {
        &self.record.payload
    }

    /// Acknowledge the record, removing it from the pending buffer
    pub fn commit(self) -> u64 {
        self.handle.commit()
    }

    pub fn into_parts(self) -> (Record, CommitHandle) {
        (self.record, self.handle)
    }
}

/// Removes one record from the pending buffer when invoked
///
/// Handles are independent of each other and of the records they were
/// issued with: committing out of arrival order is allowed.
#[derive(Debug, Clone)]
pub struct CommitHandle {
    sequence: u64,
    buffer: SharedBuffer,
    events: broadcast::Sender<LogEvent>,
}

impl CommitHandle {
    pub fn new(sequence: u64, buffer: SharedBuffer, events: broadcast::Sender<LogEvent>) -> Self {
        Self {
            sequence,
            buffer,
            events,
        }
    }

    /// Remove the record from the buffer and raise `Committed`
    ///
    /// Removing a sequence that is no longer buffered is a no-op; the
    /// notification still carries the sequence so offset layers observe
    /// every acknowledgment.
    pub fn commit(self) -> u64 {
        buffer::lock(&self.buffer).remove(self.sequence);
        let _ = self.events.send(LogEvent::Committed {
            seq: self.sequence,
        });
        self.sequence
    }
}

/// The operations every log implementation provides
#[async_trait]
pub trait Log: Send {
    /// Count of currently un-acknowledged records, not total log length
    fn size(&self) -> usize;

    /// Append a batch of lines, assigning each the next sequence number
    ///
    /// The batch is accepted or rejected as a whole: `Ok(false)` means the
    /// buffer already exceeded capacity and nothing was applied; the caller
    /// must retry explicitly. An error means the batch is not durable and
    /// nothing was applied.
    async fn append(&mut self, lines: Vec<String>) -> Result<bool, LogError>;

    /// The lowest-sequence un-acknowledged record, or `None` when empty
    fn next(&self) -> Option<LogRecord>;

    /// Every pending record, each with its own commit handle
    fn read(&self) -> Vec<LogRecord>;

    /// Subscribe to flush and commit notifications
    fn subscribe(&self) -> broadcast::Receiver<LogEvent>;

    /// Release the output stream; subsequent appends fail with
    /// [`LogError::Closed`]
    async fn close(&mut self) -> Result<(), LogError>;
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
