// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Offset-tracking queue over a volatile or durable log
//!
//! `enqueue` serializes messages into record lines and forwards them as one
//! append batch. Consumers pull with `next` (or `read`) and acknowledge
//! through the returned [`Delivery`]; each acknowledgment advances the
//! contiguous offset mark, and persistent queues append the new mark to the
//! offset-marker file before raising `OffsetUpdated`.

use crate::offset::{OffsetError, OffsetMarker, OffsetTracker};
use kyu_core::fs::DiskFs;
use kyu_core::log::{self, Log, LogError, LogEvent, LogRecord};
use kyu_core::{Message, QueueOptions, Record};
use kyu_log::{FsLog, MemLog};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};

/// Errors from queue operations
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("log error: {0}")]
    Log(#[from] LogError),
    #[error("offset error: {0}")]
    Offset(#[from] OffsetError),
    #[error("persistence requires a directory")]
    MissingDir,
}

/// Notifications raised by a queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    /// Mirrors the underlying log's flush notification
    LogFlushed { last_seq: u64 },
    /// The offset mark advanced (and, in persistent mode, was written to
    /// the marker file)
    OffsetUpdated { offset: u64 },
}

/// A persistent (or in-memory) work queue with consumer offsets
///
/// Construction must happen inside a tokio runtime; recovery of a
/// persistent queue blocks until the log and offset marker are consistent.
pub struct Queue {
    name: String,
    log: Box<dyn Log>,
    offsets: Arc<Mutex<OffsetState>>,
    events: broadcast::Sender<QueueEvent>,
}

struct OffsetState {
    tracker: OffsetTracker,
    marker: Option<OffsetMarker>,
}

impl Queue {
    /// Construct a queue from options
    ///
    /// Persistent queues read the resume offset from the marker file's
    /// last line and recover the record log to it, so the buffer starts at
    /// exactly the first un-committed record.
    pub fn new(options: QueueOptions) -> Result<Self, QueueError> {
        if !options.persistence.enabled {
            let log = MemLog::new(options.log);
            return Ok(Self::assemble(options.name, Box::new(log), 0, None));
        }

        let dir = options.persistence.dir.as_ref().ok_or(QueueError::MissingDir)?;
        let fs = DiskFs::new();
        let (marker, resume) =
            OffsetMarker::open(&fs, dir.join(format!("{}.offset", options.name)))?;
        let log = FsLog::open_from(
            dir.join(format!("{}.log", options.name)),
            options.log,
            resume,
        )?;
        tracing::debug!(name = %options.name, resume, "opened persistent queue");

        Ok(Self::assemble(
            options.name,
            Box::new(log),
            resume,
            Some(marker),
        ))
    }

    /// Construct over an existing log, without offset persistence
    pub fn with_log(name: impl Into<String>, log: Box<dyn Log>) -> Self {
        Self::assemble(name.into(), log, 0, None)
    }

    fn assemble(
        name: String,
        log: Box<dyn Log>,
        resume: u64,
        marker: Option<OffsetMarker>,
    ) -> Self {
        let events = log::event_channel();
        forward_flushes(log.subscribe(), events.clone());

        Self {
            name,
            log,
            offsets: Arc::new(Mutex::new(OffsetState {
                tracker: OffsetTracker::new(resume),
                marker,
            })),
            events,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Count of un-acknowledged records in the underlying log
    pub fn size(&self) -> usize {
        self.log.size()
    }

    /// Serialize a batch of messages and forward them as one append
    ///
    /// Returns the log's acceptance result: `Ok(false)` means the batch
    /// was rejected for capacity and should be retried later.
    pub async fn enqueue(&mut self, batch: Vec<Message>) -> Result<bool, QueueError> {
        let lines = batch.iter().map(Message::encode).collect();
        Ok(self.log.append(lines).await?)
    }

    /// The next pending message, or `None` when the queue is drained
    pub fn next(&self) -> Option<Delivery> {
        self.log.next().map(|record| self.delivery(record))
    }

    /// Every pending message, each with an independent delivery handle
    pub fn read(&self) -> Vec<Delivery> {
        self.log
            .read()
            .into_iter()
            .map(|record| self.delivery(record))
            .collect()
    }

    /// Highest contiguously committed offset (the next expected sequence)
    pub async fn last_offset(&self) -> u64 {
        self.offsets.lock().await.tracker.offset()
    }

    /// Subscribe to queue notifications
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    /// Release the underlying log's output stream
    pub async fn close(&mut self) -> Result<(), QueueError> {
        Ok(self.log.close().await?)
    }

    fn delivery(&self, inner: LogRecord) -> Delivery {
        Delivery {
            inner,
            offsets: Arc::clone(&self.offsets),
            events: self.events.clone(),
        }
    }
}

/// Mirror the log's flush notifications on the queue channel
fn forward_flushes(
    mut rx: broadcast::Receiver<LogEvent>,
    tx: broadcast::Sender<QueueEvent>,
) {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(LogEvent::Flushed { last_seq }) => {
                    let _ = tx.send(QueueEvent::LogFlushed { last_seq });
                }
                Ok(LogEvent::Committed { .. }) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "queue fell behind on log notifications");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

/// A pending record handed to a consumer, with the offset layer attached
pub struct Delivery {
    inner: LogRecord,
    offsets: Arc<Mutex<OffsetState>>,
    events: broadcast::Sender<QueueEvent>,
}

impl Delivery {
    pub fn record(&self) -> &Record {
        self.inner.record()
    }

    pub fn sequence(&self) -> u64 {
        self.inner.sequence()
    }

    pub fn payload(&self) -> &str {
        self.inner.payload()
    }

    /// Acknowledge the record
    ///
    /// Removes it from the pending buffer and advances the contiguous
    /// offset mark. When the mark advances on a persistent queue, the new
    /// value is appended to the marker file first and `OffsetUpdated` is
    /// raised only after that write completes.
    pub async fn commit(self) -> Result<u64, QueueError> {
        let seq = self.inner.commit();

        let mut state = self.offsets.lock().await;
        if let Some(offset) = state.tracker.record(seq) {
            if let Some(marker) = state.marker.as_mut() {
                marker.append(offset).await?;
            }
            let _ = self.events.send(QueueEvent::OffsetUpdated { offset });
        }
        Ok(seq)
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
