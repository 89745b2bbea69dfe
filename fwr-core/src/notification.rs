// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification payload sent to the configured remote endpoint.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Content carried by a notification, decided by `postFileContents`,
/// `maxContentBytes`, and `streamingThresholdBytes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationBody {
    /// No content: `postFileContents` is false, or the file exceeds `maxContentBytes`.
    Omitted,
    /// Content small enough to buffer and inline as base64 JSON.
    Inline(Vec<u8>),
    /// Content exceeds `streamingThresholdBytes`: the sender must stream the file
    /// from disk rather than buffer it in memory. The path is re-read per attempt.
    Streamed(PathBuf),
}

/// A single file occurrence ready to be sent.
#[derive(Debug, Clone)]
pub struct Notification {
    pub path: PathBuf,
    pub body: NotificationBody,
    pub computer_name: String,
    pub file_size: u64,
    pub last_write_time: DateTime<Utc>,
}

impl Notification {
    /// The inline JSON wire form. Streamed bodies are never serialized this
    /// way — the caller must pick the multipart path instead.
    pub fn inline_wire_body(&self) -> InlineWireBody<'_> {
        let content = match &self.body {
            NotificationBody::Inline(bytes) => Some(BASE64.encode(bytes)),
            NotificationBody::Omitted | NotificationBody::Streamed(_) => None,
        };
        InlineWireBody {
            path: self.path.to_string_lossy(),
            content,
            computer_name: &self.computer_name,
            file_size: self.file_size,
            last_write_time: self.last_write_time,
        }
    }

    pub fn is_streamed(&self) -> bool {
        matches!(self.body, NotificationBody::Streamed(_))
    }
}

#[derive(Serialize)]
pub struct InlineWireBody<'a> {
    #[serde(rename = "Path")]
    pub path: std::borrow::Cow<'a, str>,
    #[serde(rename = "Content")]
    pub content: Option<String>,
    #[serde(rename = "ComputerName")]
    pub computer_name: &'a str,
    #[serde(rename = "FileSize")]
    pub file_size: u64,
    #[serde(rename = "LastWriteTime")]
    pub last_write_time: DateTime<Utc>,
}

#[cfg(test)]
#[path = "notification_tests.rs"]
mod tests;
