// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport adapter used by the daemon's HTTP Resilience Sender.
//!
//! A transport sends exactly one request per call; retry, backoff, and circuit
//! breaking live one layer up, since they need to re-materialize the request body
//! per attempt (critical for streaming uploads).

mod reqwest_transport;

pub use reqwest_transport::ReqwestTransport;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeHttpTransport, RecordedRequest};

use async_trait::async_trait;
use filewatchrest_core::BearerToken;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// The body of an outbound notification request.
#[derive(Debug, Clone)]
pub enum OutboundBody {
    /// No file content: JSON metadata only.
    Metadata,
    /// File content small enough to inline as base64 in the JSON payload.
    Inline(Vec<u8>),
    /// File content large enough to stream as a multipart upload without
    /// buffering it in memory.
    Streamed { path: PathBuf, len: u64 },
}

#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: Url,
    pub bearer: Option<BearerToken>,
    pub json: serde_json::Value,
    pub body: OutboundBody,
}

#[derive(Debug, Clone, Copy)]
pub struct SendOutcome {
    pub status: u16,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("failed to open streamed file {path}: {source}")]
    OpenStreamedFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Sends one HTTP request and reports its outcome. Implementations do not retry;
/// that is the Resilience Sender's job, one layer up, since it needs a fresh
/// `OutboundRequest` per attempt.
#[async_trait]
pub trait HttpTransport: Send + Sync + 'static {
    async fn send(&self, request: OutboundRequest) -> Result<SendOutcome, TransportError>;
}
