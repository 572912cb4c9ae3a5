// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory filesystem adapter with failure injection, for tests

use super::{AppendFile, FsAdapter};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type Files = Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>;

/// In-memory filesystem; clones share the same file map
#[derive(Debug, Clone, Default)]
pub struct FakeFs {
    files: Files,
    fail_appends: Arc<AtomicBool>,
}

impl FakeFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent append fail with an IO error
    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Current contents of a file, if it exists
    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.lock().get(path).cloned()
    }

    /// Seed a file with contents, replacing any existing data
    pub fn write(&self, path: &Path, data: &[u8]) {
        self.lock().insert(path.to_path_buf(), data.to_vec());
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, Vec<u8>>> {
        self.files.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl FsAdapter for FakeFs {
    type File = FakeAppendFile;

    fn ensure_file(&self, path: &Path) -> io::Result<()> {
        self.lock().entry(path.to_path_buf()).or_default();
        Ok(())
    }

    fn open_append(&self, path: &Path) -> io::Result<Self::File> {
        self.ensure_file(path)?;
        Ok(FakeAppendFile {
            path: path.to_path_buf(),
            files: Arc::clone(&self.files),
            fail: Arc::clone(&self.fail_appends),
        })
    }

    fn size(&self, path: &Path) -> io::Result<u64> {
        self.lock()
            .get(path)
            .map(|data| data.len() as u64)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }

    fn read_at(&self, path: &Path, pos: u64, len: usize) -> io::Result<Vec<u8>> {
        let files = self.lock();
        let data = files
            .get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))?;

        let start = (pos as usize).min(data.len());
        let end = start.saturating_add(len).min(data.len());
        Ok(data[start..end].to_vec())
    }
}

/// Append stream over the shared in-memory file map
#[derive(Debug)]
pub struct FakeAppendFile {
    path: PathBuf,
    files: Files,
    fail: Arc<AtomicBool>,
}

#[async_trait]
impl AppendFile for FakeAppendFile {
    async fn append(&mut self, data: &[u8]) -> io::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(io::Error::other("injected append failure"));
        }
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(self.path.clone())
            .or_default()
            .extend_from_slice(data);
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
