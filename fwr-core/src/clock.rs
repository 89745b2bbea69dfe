// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time and jitter handling.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// A clock that provides the current time plus a jitter source for backoff.
///
/// Object-safe by design: production call sites share one instance behind an
/// `Arc<dyn Clock>` and clone the `Arc` into spawned tasks.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
    fn epoch_ms(&self) -> u64;

    /// A uniform random value in `[0, bound)`, used for jittered backoff.
    /// Returns 0 when `bound` is 0.
    fn jitter(&self, bound: Duration) -> Duration;
}

/// Real system clock backed by `rand::random` for jitter.
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    fn jitter(&self, bound: Duration) -> Duration {
        if bound.is_zero() {
            return Duration::ZERO;
        }
        let frac: f64 = rand_fraction();
        Duration::from_secs_f64(bound.as_secs_f64() * frac)
    }
}

/// Draws a uniform `[0, 1)` fraction without pulling in the full `rand` API surface
/// at every call site; kept as a free function so the resilience sender doesn't need
/// its own RNG plumbing.
fn rand_fraction() -> f64 {
    use rand::Rng;
    rand::rng().random::<f64>()
}

/// Fake clock for deterministic tests: time only moves when `advance` is called,
/// and jitter is a scripted queue (defaulting to zero) rather than real randomness.
#[derive(Clone)]
pub struct FakeClock {
    current: Arc<Mutex<Instant>>,
    epoch_ms: Arc<AtomicU64>,
    scripted_jitter: Arc<Mutex<Vec<Duration>>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(Instant::now())),
            epoch_ms: Arc::new(AtomicU64::new(1_000_000)),
            scripted_jitter: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Advance the clock by the given duration.
    pub fn advance(&self, duration: Duration) {
        *self.current.lock() += duration;
        self.epoch_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    /// Set the epoch milliseconds value directly.
    pub fn set_epoch_ms(&self, ms: u64) {
        self.epoch_ms.store(ms, Ordering::SeqCst);
    }

    /// Queue jitter values to be returned in order by successive `jitter()` calls.
    /// Once exhausted, `jitter()` returns `Duration::ZERO`.
    pub fn script_jitter(&self, values: impl IntoIterator<Item = Duration>) {
        let mut queue = self.scripted_jitter.lock();
        queue.extend(values);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        *self.current.lock()
    }

    fn epoch_ms(&self) -> u64 {
        self.epoch_ms.load(Ordering::SeqCst)
    }

    fn jitter(&self, _bound: Duration) -> Duration {
        let mut queue = self.scripted_jitter.lock();
        if queue.is_empty() {
            Duration::ZERO
        } else {
            queue.remove(0)
        }
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
