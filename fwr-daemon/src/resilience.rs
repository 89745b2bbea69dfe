// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP Resilience Sender: one logical send with retries, jittered exponential
//! backoff, and a per-endpoint circuit breaker.

use crate::circuit_registry::CircuitRegistry;
use filewatchrest_adapters::{HttpTransport, OutboundRequest, TransportError};
use filewatchrest_core::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Classification {
    Success,
    Retryable,
    NonRetryable,
}

fn classify(status: u16) -> Classification {
    match status {
        200..=299 => Classification::Success,
        408 | 429 => Classification::Retryable,
        500..=599 => Classification::Retryable,
        _ => Classification::NonRetryable,
    }
}

#[derive(Debug, Clone)]
pub struct ResilienceConfig {
    pub retries: u32,
    pub retry_delay: Duration,
    pub enable_circuit_breaker: bool,
    pub circuit_breaker_failure_threshold: u32,
    pub circuit_breaker_open_duration: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct SendResult {
    pub success: bool,
    pub short_circuited: bool,
    pub status_code: Option<u16>,
    pub attempts: u32,
}

pub struct ResilienceSender {
    transport: Arc<dyn HttpTransport>,
    circuit: Arc<CircuitRegistry>,
    clock: Arc<dyn Clock>,
}

impl ResilienceSender {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        circuit: Arc<CircuitRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transport,
            circuit,
            clock,
        }
    }

    /// Sends one logical notification, retrying per `config` and consulting
    /// (and updating) the circuit breaker keyed by `endpoint_key`.
    ///
    /// `request_factory` is called once per attempt so the body (in particular
    /// a streaming upload) is freshly materialized every time.
    pub async fn send<F>(
        &self,
        endpoint_key: &str,
        config: &ResilienceConfig,
        cancel: &CancellationToken,
        mut request_factory: F,
    ) -> SendResult
    where
        F: FnMut() -> OutboundRequest,
    {
        if config.enable_circuit_breaker && self.circuit.is_open(endpoint_key, self.clock.now()) {
            return SendResult {
                success: false,
                short_circuited: true,
                status_code: None,
                attempts: 0,
            };
        }

        let max_attempts = config.retries.saturating_add(1).max(1);
        let mut attempts = 0;
        let mut last_status = None;

        for attempt in 1..=max_attempts {
            attempts = attempt;
            let request = request_factory();
            let outcome = self.transport.send(request).await;

            let (classification, status) = match outcome {
                Ok(outcome) => (classify(outcome.status), Some(outcome.status)),
                Err(TransportError::Timeout) => (Classification::Retryable, None),
                Err(_) => (Classification::Retryable, None),
            };
            last_status = status;

            match classification {
                Classification::Success => {
                    self.circuit.record_success(endpoint_key);
                    return SendResult {
                        success: true,
                        short_circuited: false,
                        status_code: status,
                        attempts,
                    };
                }
                Classification::NonRetryable => {
                    self.record_final_failure(endpoint_key, config);
                    return SendResult {
                        success: false,
                        short_circuited: false,
                        status_code: status,
                        attempts,
                    };
                }
                Classification::Retryable => {
                    if attempt == max_attempts {
                        self.record_final_failure(endpoint_key, config);
                        return SendResult {
                            success: false,
                            short_circuited: false,
                            status_code: status,
                            attempts,
                        };
                    }

                    let backoff = config.retry_delay.saturating_mul(1 << (attempt - 1));
                    let jitter = self.clock.jitter(config.retry_delay);
                    let sleep_for = backoff + jitter;

                    tokio::select! {
                        _ = cancel.cancelled() => {
                            return SendResult {
                                success: false,
                                short_circuited: false,
                                status_code: last_status,
                                attempts,
                            };
                        }
                        _ = tokio::time::sleep(sleep_for) => {}
                    }
                }
            }
        }

        SendResult {
            success: false,
            short_circuited: false,
            status_code: last_status,
            attempts,
        }
    }

    fn record_final_failure(&self, endpoint_key: &str, config: &ResilienceConfig) {
        if config.enable_circuit_breaker {
            self.circuit.record_failure(
                endpoint_key,
                self.clock.now(),
                config.circuit_breaker_failure_threshold,
                config.circuit_breaker_open_duration,
            );
        }
    }
}

#[cfg(test)]
#[path = "resilience_tests.rs"]
mod tests;
