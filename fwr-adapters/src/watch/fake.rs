// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake watch backend for testing: lets a test push synthetic events for a
//! watched root without touching the real filesystem.

use super::{RawWatchEvent, WatchBackend, WatchError, WatchHandle};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

struct FakeState {
    senders: HashMap<PathBuf, mpsc::Sender<RawWatchEvent>>,
    watched: Vec<PathBuf>,
    stopped: Vec<PathBuf>,
}

#[derive(Clone)]
pub struct FakeWatchBackend {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeWatchBackend {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                senders: HashMap::new(),
                watched: Vec::new(),
                stopped: Vec::new(),
            })),
        }
    }
}

impl FakeWatchBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths currently under a `watch()` call, in call order.
    pub fn watched_roots(&self) -> Vec<PathBuf> {
        self.inner.lock().watched.clone()
    }

    /// Paths whose handle has been stopped.
    pub fn stopped_roots(&self) -> Vec<PathBuf> {
        self.inner.lock().stopped.clone()
    }

    /// Deliver a synthetic event to whichever watch is active for `root`.
    /// Silently drops the event if `root` is not currently watched.
    pub async fn push(&self, root: &Path, event: RawWatchEvent) {
        let sender = self.inner.lock().senders.get(root).cloned();
        if let Some(sender) = sender {
            let _ = sender.send(event).await;
        }
    }
}

struct FakeWatchHandle {
    root: PathBuf,
    inner: Arc<Mutex<FakeState>>,
}

#[async_trait]
impl WatchHandle for FakeWatchHandle {
    fn stop(&self) {
        let mut state = self.inner.lock();
        state.senders.remove(&self.root);
        state.stopped.push(self.root.clone());
    }
}

#[async_trait]
impl WatchBackend for FakeWatchBackend {
    async fn watch(
        &self,
        root: &Path,
        _recursive: bool,
    ) -> Result<(Box<dyn WatchHandle>, mpsc::Receiver<RawWatchEvent>), WatchError> {
        let (tx, rx) = mpsc::channel(64);
        let mut state = self.inner.lock();
        state.senders.insert(root.to_path_buf(), tx);
        state.watched.push(root.to_path_buf());
        drop(state);

        Ok((
            Box::new(FakeWatchHandle {
                root: root.to_path_buf(),
                inner: Arc::clone(&self.inner),
            }),
            rx,
        ))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
