// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watcher Supervisor: maintains one filesystem watcher per configured folder
//! and forwards filtered raw events to the Debounce Coalescer.
//!
//! State machine per watcher: `Starting -> Running <-> Restarting -> Failed ->
//! (on reconcile) Starting`. Terminal only on supervisor stop.

use crate::debounce::Debouncer;
use filewatchrest_adapters::{RawEventKind, WatchBackend};
use filewatchrest_core::{Configuration, DiagnosticsRing, EventKind};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Starting,
    Running,
    Restarting,
    Failed,
}

/// Status shared between the supervisor's entry and the watcher's own task, so
/// the task can report its own transitions without a round trip through the
/// supervisor's map lock.
#[derive(Debug, Default)]
struct SharedStatus {
    state: Mutex<WatcherState>,
    restart_count: std::sync::atomic::AtomicU32,
}

impl Default for WatcherState {
    fn default() -> Self {
        WatcherState::Starting
    }
}

struct WatcherEntry {
    status: Arc<SharedStatus>,
    cancel: CancellationToken,
    #[allow(dead_code)]
    task: JoinHandle<()>,
}

pub struct WatcherSupervisor {
    backend: Arc<dyn WatchBackend>,
    debouncer: Arc<Debouncer>,
    config_rx: watch::Receiver<Arc<Configuration>>,
    diagnostics: Arc<Mutex<DiagnosticsRing>>,
    watchers: Mutex<HashMap<PathBuf, WatcherEntry>>,
}

impl WatcherSupervisor {
    pub fn new(
        backend: Arc<dyn WatchBackend>,
        debouncer: Arc<Debouncer>,
        config_rx: watch::Receiver<Arc<Configuration>>,
        diagnostics: Arc<Mutex<DiagnosticsRing>>,
    ) -> Self {
        Self {
            backend,
            debouncer,
            config_rx,
            diagnostics,
            watchers: Mutex::new(HashMap::new()),
        }
    }

    /// Starts watchers for folders newly present in `config.folders` and stops
    /// ones no longer present. Idempotent.
    pub fn reconcile(&self, config: &Configuration) {
        let desired: std::collections::BTreeSet<PathBuf> = config.folders.clone();
        let current: Vec<PathBuf> = self.watchers.lock().keys().cloned().collect();

        for path in &current {
            if !desired.contains(path) {
                self.stop_one(path);
            }
        }
        for path in desired {
            if !self.watchers.lock().contains_key(&path) {
                self.start_one(path, config.include_subdirectories);
            }
        }
    }

    pub fn stop(&self) {
        let paths: Vec<PathBuf> = self.watchers.lock().keys().cloned().collect();
        for path in paths {
            self.stop_one(&path);
        }
    }

    pub fn active_paths(&self) -> Vec<PathBuf> {
        self.watchers.lock().keys().cloned().collect()
    }

    pub fn restart_count(&self, path: &PathBuf) -> Option<u32> {
        self.watchers
            .lock()
            .get(path)
            .map(|e| e.status.restart_count.load(std::sync::atomic::Ordering::SeqCst))
    }

    pub fn state_of(&self, path: &PathBuf) -> Option<WatcherState> {
        self.watchers.lock().get(path).map(|e| *e.status.state.lock())
    }

    fn stop_one(&self, path: &PathBuf) {
        if let Some(entry) = self.watchers.lock().remove(path) {
            entry.cancel.cancel();
        }
    }

    fn start_one(&self, path: PathBuf, recursive: bool) {
        let cancel = CancellationToken::new();
        let backend = Arc::clone(&self.backend);
        let debouncer = Arc::clone(&self.debouncer);
        let config_rx = self.config_rx.clone();
        let diagnostics = Arc::clone(&self.diagnostics);
        let status = Arc::new(SharedStatus::default());
        let restart_delay_path = path.clone();

        let task = tokio::spawn(run_watcher_loop(
            path.clone(),
            recursive,
            backend,
            debouncer,
            config_rx,
            diagnostics,
            Arc::clone(&status),
            cancel.clone(),
        ));

        self.watchers.lock().insert(
            restart_delay_path,
            WatcherEntry {
                status,
                cancel,
                task,
            },
        );
    }
}

fn extension_of(path: &std::path::Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default()
}

async fn run_watcher_loop(
    root: PathBuf,
    recursive: bool,
    backend: Arc<dyn WatchBackend>,
    debouncer: Arc<Debouncer>,
    config_rx: watch::Receiver<Arc<Configuration>>,
    diagnostics: Arc<Mutex<DiagnosticsRing>>,
    status: Arc<SharedStatus>,
    cancel: CancellationToken,
) {
    use std::sync::atomic::Ordering;

    let max_attempts = config_rx.borrow().watcher_max_restart_attempts;
    let restart_delay = config_rx.borrow().watcher_restart_delay_ms;

    loop {
        if cancel.is_cancelled() {
            return;
        }

        let watch_result = backend.watch(&root, recursive).await;
        let (handle, mut rx) = match watch_result {
            Ok(pair) => pair,
            Err(_) => {
                let restart_count = status.restart_count.fetch_add(1, Ordering::SeqCst) + 1;
                if restart_count > max_attempts {
                    *status.state.lock() = WatcherState::Failed;
                    return;
                }
                *status.state.lock() = WatcherState::Restarting;
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(std::time::Duration::from_millis(restart_delay)) => {}
                }
                continue;
            }
        };
        *status.state.lock() = WatcherState::Running;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    handle.stop();
                    return;
                }
                event = rx.recv() => {
                    match event {
                        Some(raw) => {
                            let config = config_rx.borrow().clone();
                            if !passes_filter(&raw.path, &config) {
                                continue;
                            }
                            let kind = match raw.kind {
                                RawEventKind::Created => EventKind::Created,
                                RawEventKind::Changed => EventKind::Changed,
                            };
                            debouncer.observe(raw.path, kind);
                        }
                        None => {
                            // Channel closed: treat as an overflow/internal error,
                            // restart the native watcher in place.
                            diagnostics.lock().push(filewatchrest_core::DiagnosticEventRecord {
                                path: root.clone(),
                                timestamp: chrono::Utc::now(),
                                posted_success: false,
                                status_code: None,
                            });
                            let restart_count = status.restart_count.fetch_add(1, Ordering::SeqCst) + 1;
                            if restart_count > max_attempts {
                                *status.state.lock() = WatcherState::Failed;
                                handle.stop();
                                return;
                            }
                            *status.state.lock() = WatcherState::Restarting;
                            tokio::select! {
                                _ = cancel.cancelled() => { handle.stop(); return; }
                                _ = tokio::time::sleep(std::time::Duration::from_millis(restart_delay)) => {}
                            }
                            break;
                        }
                    }
                }
            }
        }
    }
}

fn passes_filter(path: &std::path::Path, config: &Configuration) -> bool {
    if config.is_in_processed_folder(path) {
        return false;
    }
    config.extension_allowed(&extension_of(path))
}

#[cfg(test)]
#[path = "watcher_supervisor_tests.rs"]
mod tests;
