// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed log implementation

use crate::recovery;
use async_trait::async_trait;
use kyu_core::buffer::{self, OrderedBuffer, SharedBuffer};
use kyu_core::fs::{AppendFile, DiskFs, FsAdapter};
use kyu_core::log::{self, CommitHandle, Log, LogError, LogEvent, LogRecord};
use kyu_core::{LogOptions, Record};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Durable log: an append-only file plus an in-memory buffer of
/// un-acknowledged records
///
/// The buffer is a side effect of persistence: everything in it has
/// already been durably written. On startup the buffer is reconstructed
/// from the file by scanning backward to the requested resume offset.
pub struct FsLog<F: FsAdapter = DiskFs> {
    path: PathBuf,
    file: Option<F::File>,
    buffer: SharedBuffer,
    next_seq: u64,
    bytes_written: u64,
    options: LogOptions,
    events: broadcast::Sender<LogEvent>,
}

impl FsLog<DiskFs> {
    /// Open or create a log file, loading every existing record
    pub fn open(path: impl Into<PathBuf>, options: LogOptions) -> Result<Self, LogError> {
        Self::open_with(DiskFs::new(), path, options, 0)
    }

    /// Open a log file, resuming from the given offset
    pub fn open_from(
        path: impl Into<PathBuf>,
        options: LogOptions,
        offset: u64,
    ) -> Result<Self, LogError> {
        Self::open_with(DiskFs::new(), path, options, offset)
    }
}

impl<F: FsAdapter> FsLog<F> {
    /// Open with an explicit filesystem adapter
    ///
    /// Recovery is deliberately blocking: the instance reaches a
    /// consistent state before accepting any work.
    pub fn open_with(
        fs: F,
        path: impl Into<PathBuf>,
        options: LogOptions,
        offset: u64,
    ) -> Result<Self, LogError> {
        let path = path.into();
        fs.ensure_file(&path)?;

        let recovered = recovery::recover(&fs, &path, offset)?;
        tracing::debug!(
            path = %path.display(),
            pending = recovered.records.len(),
            next_seq = recovered.next_seq,
            "recovered log"
        );

        let file = fs.open_append(&path)?;
        let mut buffer = OrderedBuffer::new();
        for record in recovered.records {
            buffer.push(record);
        }

        Ok(Self {
            path,
            file: Some(file),
            buffer: buffer.shared(),
            next_seq: recovered.next_seq,
            bytes_written: 0,
            options,
            events: log::event_channel(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
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

    // Size-based rotation is not implemented; this is the hook where it
    // would trigger.
    fn check_rotation(&self) {
        if let Some(max_size) = self.options.max_size {
            if self.bytes_written > max_size {
                tracing::debug!(
                    path = %self.path.display(),
                    bytes_written = self.bytes_written,
                    max_size,
                    "log exceeded max_size; rotation not implemented"
                );
            }
        }
    }
}

#[async_trait]
impl<F: FsAdapter> Log for FsLog<F> {
    fn size(&self) -> usize {
        buffer::lock(&self.buffer).len()
    }

    async fn append(&mut self, lines: Vec<String>) -> Result<bool, LogError> {
        if self.file.is_none() {
            return Err(LogError::Closed);
        }
        if buffer::lock(&self.buffer).len() > self.options.capacity {
            return Ok(false);
        }
        if lines.is_empty() {
            return Ok(true);
        }

        let records: Vec<Record> = lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| Record::new(self.next_seq + i as u64, line))
            .collect();
        let mut data = records
            .iter()
            .map(Record::to_line)
            .collect::<Vec<_>>()
            .join("\n");
        data.push('\n');

        // The write is the durability boundary: nothing is applied until
        // it completes. On error the batch is treated as never-happened.
        let file = self.file.as_mut().ok_or(LogError::Closed)?;
        if let Err(err) = file.append(data.as_bytes()).await {
            tracing::error!(
                path = %self.path.display(),
                error = %err,
                "append failed; batch not applied"
            );
            return Err(err.into());
        }

        self.next_seq += records.len() as u64;
        self.bytes_written += data.len() as u64;
        let last_seq = self.next_seq - 1;
        {
            let mut buffer = buffer::lock(&self.buffer);
            for record in records {
                buffer.push(record);
            }
        }

        self.check_rotation();
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
        self.file = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
