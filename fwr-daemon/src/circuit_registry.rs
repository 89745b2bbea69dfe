// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-endpoint circuit breaker registry, shared between the Resilience Sender
//! (which updates it) and the diagnostics endpoint (which reads snapshots).

use filewatchrest_core::CircuitState;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub struct CircuitRegistry {
    states: Mutex<HashMap<String, CircuitState>>,
}

impl CircuitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self, endpoint_key: &str, now: Instant) -> bool {
        self.states
            .lock()
            .get(endpoint_key)
            .is_some_and(|s| s.is_open(now))
    }

    pub fn record_success(&self, endpoint_key: &str) {
        self.states
            .lock()
            .entry(endpoint_key.to_string())
            .or_default()
            .record_success();
    }

    pub fn record_failure(
        &self,
        endpoint_key: &str,
        now: Instant,
        threshold: u32,
        open_duration: Duration,
    ) {
        self.states
            .lock()
            .entry(endpoint_key.to_string())
            .or_default()
            .record_failure(now, threshold, open_duration);
    }

    /// Snapshot of `endpointKey -> isOpen` for the diagnostics endpoint.
    pub fn snapshot(&self, now: Instant) -> HashMap<String, bool> {
        self.states
            .lock()
            .iter()
            .map(|(key, state)| (key.clone(), state.is_open(now)))
            .collect()
    }
}

#[cfg(test)]
#[path = "circuit_registry_tests.rs"]
mod tests;
