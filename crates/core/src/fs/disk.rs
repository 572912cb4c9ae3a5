// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Disk-backed filesystem adapter

use super::{AppendFile, FsAdapter};
use async_trait::async_trait;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// The real filesystem: std for the blocking startup reads, tokio for the
/// append stream
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFs;

impl DiskFs {
    pub fn new() -> Self {
        Self
    }
}

impl FsAdapter for DiskFs {
    type File = DiskAppendFile;

    fn ensure_file(&self, path: &Path) -> io::Result<()> {
        if path.exists() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        File::create(path)?;
        tracing::debug!(path = %path.display(), "created file");
        Ok(())
    }

    fn open_append(&self, path: &Path) -> io::Result<Self::File> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(DiskAppendFile {
            file: tokio::fs::File::from_std(file),
        })
    }

    fn size(&self, path: &Path) -> io::Result<u64> {
        Ok(std::fs::metadata(path)?.len())
    }

    fn read_at(&self, path: &Path, pos: u64, len: usize) -> io::Result<Vec<u8>> {
        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(pos))?;

        let mut buf = vec![0u8; len];
        let mut read = 0;
        while read < len {
            let n = file.read(&mut buf[read..])?;
            if n == 0 {
                break;
            }
            read += n;
        }
        buf.truncate(read);
        Ok(buf)
    }
}

/// Append stream over a tokio file
#[derive(Debug)]
pub struct DiskAppendFile {
    file: tokio::fs::File,
}

#[async_trait]
impl AppendFile for DiskAppendFile {
    async fn append(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data).await?;
        // sync before reporting completion: the caller treats a returned
        // Ok as the durability boundary
        self.file.sync_all().await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "disk_tests.rs"]
mod tests;
