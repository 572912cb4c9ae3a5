// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message types enqueued by producers

use serde::{Deserialize, Serialize};

/// Application data carried by a message: raw text or structured JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Text(String),
    Structured(serde_json::Value),
}

/// A queue message prior to sequencing
///
/// Encoded payloads become a single record line, so text data must not
/// contain newlines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Application key; the first token of the encoded line
    pub key: String,
    /// The message body
    pub data: Payload,
    /// Optional structured metadata, JSON-encoded after the data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl Message {
    /// Create a message with a raw text body
    pub fn text(key: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            data: Payload::Text(data.into()),
            meta: None,
        }
    }

    /// Create a message with a structured JSON body
    pub fn structured(key: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            data: Payload::Structured(data),
            meta: None,
        }
    }

    /// Attach metadata
    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Encode as the log line `<key> <data>[ <meta>]`
    pub fn encode(&self) -> String {
        let data = match &self.data {
            Payload::Text(text) => text.clone(),
            Payload::Structured(value) => value.to_string(),
        };

        let mut line = format!("{} {}", self.key, data);
        if let Some(meta) = &self.meta {
            line.push(' ');
            line.push_str(&meta.to_string());
        }
        line
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
