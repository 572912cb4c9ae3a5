// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration types for logs and queues

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Default soft cap on buffered records
const DEFAULT_CAPACITY: usize = 200;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Options for a single log instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogOptions {
    /// Soft cap on buffered records: appends are rejected once the buffer
    /// already exceeds this, so the cap can be overshot by one batch
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Rotation threshold in bytes (rotation itself is not implemented)
    #[serde(default)]
    pub max_size: Option<u64>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_size: None,
        }
    }
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

/// Disk persistence settings for a queue
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistenceOptions {
    /// Use the durable file-backed log instead of the in-memory log
    #[serde(default)]
    pub enabled: bool,
    /// Directory holding the record and offset-marker files
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Options for constructing a queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueOptions {
    /// Queue name; used as the stem of the record and marker filenames
    pub name: String,
    #[serde(default)]
    pub persistence: PersistenceOptions,
    #[serde(default)]
    pub log: LogOptions,
}

impl QueueOptions {
    /// In-memory queue with default log options
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            persistence: PersistenceOptions::default(),
            log: LogOptions::default(),
        }
    }

    /// Disk-backed queue persisting into the given directory
    pub fn persistent(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            persistence: PersistenceOptions {
                enabled: true,
                dir: Some(dir.into()),
            },
            log: LogOptions::default(),
        }
    }

    /// Parse options from a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
