// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Native OS filesystem watcher, backed by the `notify` crate's recommended
//! platform backend (inotify/FSEvents/ReadDirectoryChangesW).

use super::{RawEventKind, RawWatchEvent, WatchBackend, WatchError, WatchHandle};
use async_trait::async_trait;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::Path;
use tokio::sync::mpsc;

#[derive(Debug, Default)]
pub struct NotifyWatchBackend;

impl NotifyWatchBackend {
    pub fn new() -> Self {
        Self
    }
}

struct NativeWatchHandle {
    // Keeping the watcher alive is what keeps the OS subscription alive; dropping
    // it (via `stop`) tears down the native handle.
    watcher: parking_lot::Mutex<Option<RecommendedWatcher>>,
}

#[async_trait]
impl WatchHandle for NativeWatchHandle {
    fn stop(&self) {
        self.watcher.lock().take();
    }
}

#[async_trait]
impl WatchBackend for NotifyWatchBackend {
    async fn watch(
        &self,
        root: &Path,
        recursive: bool,
    ) -> Result<(Box<dyn WatchHandle>, mpsc::Receiver<RawWatchEvent>), WatchError> {
        let (raw_tx, raw_rx) = mpsc::channel::<Event>(1024);
        let (out_tx, out_rx) = mpsc::channel::<RawWatchEvent>(1024);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                // best-effort: a full channel means the consumer is behind, and
                // the Watcher Supervisor's overflow handling covers recovery.
                let _ = raw_tx.try_send(event);
            }
        })
        .map_err(|source| WatchError::Start {
            path: root.to_path_buf(),
            source,
        })?;

        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher
            .watch(root, mode)
            .map_err(|source| WatchError::Start {
                path: root.to_path_buf(),
                source,
            })?;

        tokio::spawn(translate_events(raw_rx, out_tx));

        Ok((
            Box::new(NativeWatchHandle {
                watcher: parking_lot::Mutex::new(Some(watcher)),
            }),
            out_rx,
        ))
    }
}

async fn translate_events(
    mut raw_rx: mpsc::Receiver<Event>,
    out_tx: mpsc::Sender<RawWatchEvent>,
) {
    while let Some(event) = raw_rx.recv().await {
        let kind = match event.kind {
            EventKind::Create(_) => RawEventKind::Created,
            EventKind::Modify(_) | EventKind::Remove(_) => RawEventKind::Changed,
            _ => continue,
        };
        for path in event.paths {
            if out_tx
                .send(RawWatchEvent {
                    path,
                    kind,
                })
                .await
                .is_err()
            {
                return;
            }
        }
    }
}

#[cfg(test)]
#[path = "desktop_tests.rs"]
mod tests;
