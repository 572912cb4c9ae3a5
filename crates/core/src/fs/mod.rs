// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem capability consumed by the durable log and offset marker
//!
//! Injected as a trait so tests can run against an in-memory filesystem
//! with failure injection. Startup reads are synchronous (recovery blocks
//! until the instance is consistent); appends are the async suspension
//! points of the system.

mod disk;
mod fake;

pub use disk::DiskFs;
pub use fake::FakeFs;

use async_trait::async_trait;
use std::io;
use std::path::Path;

/// An append-only output stream bound to one file
///
/// The stream is exclusively owned by one log or marker instance from
/// construction until close.
#[async_trait]
pub trait AppendFile: Send {
    /// Append bytes; completion is the durability boundary
    async fn append(&mut self, data: &[u8]) -> io::Result<()>;
}

/// Filesystem operations the storage layer depends on
pub trait FsAdapter: Send + Sync {
    type File: AppendFile + 'static;

    /// Create the file (and parent directories) if absent
    fn ensure_file(&self, path: &Path) -> io::Result<()>;

    /// Open the file for appending
    fn open_append(&self, path: &Path) -> io::Result<Self::File>;

    /// Size of the file in bytes
    fn size(&self, path: &Path) -> io::Result<u64>;

    /// Read up to `len` bytes starting at `pos`
    fn read_at(&self, path: &Path, pos: u64, len: usize) -> io::Result<Vec<u8>>;
}
