// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake HTTP transport for testing the Resilience Sender without a network.

use super::{HttpTransport, OutboundRequest, SendOutcome, TransportError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: url::Url,
    pub had_bearer: bool,
    pub json: serde_json::Value,
}

enum ScriptedResult {
    Outcome(SendOutcome),
    Err(&'static str),
}

struct FakeState {
    calls: Vec<RecordedRequest>,
    script: VecDeque<ScriptedResult>,
    default_status: u16,
}

/// Fake transport driven by a queue of scripted responses; once the queue is
/// exhausted, every further call returns `default_status` (200 by default).
#[derive(Clone)]
pub struct FakeHttpTransport {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeHttpTransport {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                calls: Vec::new(),
                script: VecDeque::new(),
                default_status: 200,
            })),
        }
    }
}

impl FakeHttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_default_status(&self, status: u16) {
        self.inner.lock().default_status = status;
    }

    pub fn script_status(&self, status: u16) {
        self.inner
            .lock()
            .script
            .push_back(ScriptedResult::Outcome(SendOutcome { status }));
    }

    /// Script a transport-level failure (as opposed to an HTTP status code).
    pub fn script_transport_error(&self) {
        self.inner
            .lock()
            .script
            .push_back(ScriptedResult::Err("scripted transport failure"));
    }

    pub fn calls(&self) -> Vec<RecordedRequest> {
        self.inner.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.lock().calls.len()
    }
}

#[async_trait]
impl HttpTransport for FakeHttpTransport {
    async fn send(&self, request: OutboundRequest) -> Result<SendOutcome, TransportError> {
        let mut state = self.inner.lock();
        state.calls.push(RecordedRequest {
            url: request.url,
            had_bearer: request.bearer.is_some(),
            json: request.json,
        });

        match state.script.pop_front() {
            Some(ScriptedResult::Outcome(outcome)) => Ok(outcome),
            Some(ScriptedResult::Err(_)) => Err(TransportError::Timeout),
            None => Ok(SendOutcome {
                status: state.default_status,
            }),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
