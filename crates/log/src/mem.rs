// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory log implementation

use async_trait::async_trait;
use kyu_core::buffer::{self, OrderedBuffer, SharedBuffer};
use kyu_core::log::{self, CommitHandle, Log, LogError, LogEvent, LogRecord};
use kyu_core::{LogOptions, Record};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Volatile log: sequencing and buffering without persistence
///
/// Appends are applied synchronously; the flush notification still fires so
/// consumers observe the same lifecycle as with the durable log.
#[derive(Debug)]
pub struct MemLog {
    buffer: SharedBuffer,
    next_seq: u64,
    options: LogOptions,
    events: broadcast::Sender<LogEvent>,
    closed: bool,
}

impl MemLog {
    pub fn new(options: LogOptions) -> Self {
        Self {
            buffer: OrderedBuffer::new().shared(),
            next_seq: 0,
            options,
            events: log::event_channel(),
            closed: false,
        }
    }

    /// Last assigned sequence, if any record was ever appended
    pub fn last_sequence(&self) -> Option<u64> {
        self.next_seq.checked_sub(1)
    }

    fn log_record(&self, record: Record) -> LogRecord {
        let handle = CommitHandle::new(
            record.sequence,
            Arc::clone(&self.buffer),
            self.events.clone(),
        );
        LogRecord::new(record, handle)
    }
}

#[async_trait]
impl Log for MemLog {
    fn size(&self) -> usize {
        buffer::lock(&self.buffer).len()
    }

    async fn append(&mut self, lines: Vec<String>) -> Result<bool, LogError> {
        if self.closed {
            return Err(LogError::Closed);
        }
        if buffer::lock(&self.buffer).len() > self.options.capacity {
            return Ok(false);
        }
        if lines.is_empty() {
            return Ok(true);
        }

        let mut last_seq = self.next_seq;
        {
            let mut buffer = buffer::lock(&self.buffer);
            for line in lines {
                let record = Record::new(self.next_seq, line);
                last_seq = record.sequence;
                self.next_seq += 1;
                buffer.push(record);
            }
        }

        let _ = self.events.send(LogEvent::Flushed { last_seq });
        Ok(true)
    }

    fn next(&self) -> Option<LogRecord> {
        let record = buffer::lock(&self.buffer).front().cloned()?;
        Some(self.log_record(record))
    }

    fn read(&self) -> Vec<LogRecord> {
        let records = buffer::lock(&self.buffer).map(Record::clone);
        records.into_iter().map(|r| self.log_record(r)).collect()
    }

    fn subscribe(&self) -> broadcast::Receiver<LogEvent> {
        self.events.subscribe()
    }

    async fn close(&mut self) -> Result<(), LogError> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "mem_tests.rs"]
mod tests;
