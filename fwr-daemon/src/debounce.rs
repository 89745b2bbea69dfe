// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Debounce Coalescer: reduces a burst of filesystem events per path to one
//! downstream `FileEvent` after a configurable quiet interval.
//!
//! The coalescing table itself (`DebounceTable`) is a plain, synchronous,
//! time-injected structure — one timer per path, polled rather than callback
//! driven — so it can be exercised directly against a `FakeClock` in tests. The
//! async `Debouncer` wraps it with a background task that sleeps until the next
//! deadline using the real clock.

use filewatchrest_core::{Clock, EventKind, FileEvent};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
struct Pending {
    kind: EventKind,
    fires_at: Instant,
}

/// Synchronous coalescing table: one pending timer per path.
#[derive(Debug, Default)]
pub struct DebounceTable {
    pending: HashMap<PathBuf, Pending>,
}

impl DebounceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule or refresh the timer for `path`. Repeated observations coalesce
    /// `kind` (per `EventKind::coalesce`) and reset the deadline to
    /// `now + debounce`.
    pub fn observe(&mut self, path: PathBuf, kind: EventKind, now: Instant, debounce: Duration) {
        let fires_at = now + debounce;
        self.pending
            .entry(path)
            .and_modify(|p| {
                p.kind = p.kind.coalesce(kind);
                p.fires_at = fires_at;
            })
            .or_insert(Pending { kind, fires_at });
    }

    /// Remove and return every entry whose deadline has elapsed, as `FileEvent`s
    /// stamped with `now`.
    pub fn drain_fired(&mut self, now: Instant) -> Vec<FileEvent> {
        let fired: Vec<PathBuf> = self
            .pending
            .iter()
            .filter(|(_, p)| p.fires_at <= now)
            .map(|(path, _)| path.clone())
            .collect();

        fired
            .into_iter()
            .filter_map(|path| {
                self.pending.remove(&path).map(|p| {
                    FileEvent::new(path, p.kind, std::time::SystemTime::now())
                })
            })
            .collect()
    }

    /// Earliest pending deadline, if any — used to size the next sleep.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.fires_at).min()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Async wrapper: owns a `DebounceTable` behind a lock, a background task wakes
/// at the next deadline (or a short fallback poll interval when nothing is
/// pending) and pushes fired events to `output`.
pub struct Debouncer {
    table: Arc<parking_lot::Mutex<DebounceTable>>,
    debounce: Duration,
    clock: Arc<dyn Clock>,
}

impl Debouncer {
    pub fn new(debounce: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            table: Arc::new(parking_lot::Mutex::new(DebounceTable::new())),
            debounce,
            clock,
        }
    }

    /// Non-blocking: schedules or refreshes the timer for `path`.
    pub fn observe(&self, path: PathBuf, kind: EventKind) {
        let now = self.clock.now();
        if self.debounce.is_zero() {
            // debounceMs = 0 is an immediate pass-through, still funneled
            // through the table so per-path ordering stays serialized.
            self.table.lock().observe(path, kind, now, Duration::ZERO);
            return;
        }
        self.table.lock().observe(path, kind, now, self.debounce);
    }

    /// Runs until `cancel` fires, pushing coalesced events to `output`.
    pub async fn run(self: Arc<Self>, output: mpsc::Sender<FileEvent>, cancel: CancellationToken) {
        const FALLBACK_POLL: Duration = Duration::from_millis(50);

        loop {
            let sleep_for = {
                let table = self.table.lock();
                match table.next_deadline() {
                    Some(deadline) => deadline.saturating_duration_since(self.clock.now()),
                    None => FALLBACK_POLL,
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(sleep_for) => {}
            }

            let fired = self.table.lock().drain_fired(self.clock.now());
            for event in fired {
                if output.send(event).await.is_err() {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "debounce_tests.rs"]
mod tests;
