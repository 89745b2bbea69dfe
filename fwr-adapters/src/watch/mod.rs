// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem watch adapters.

mod desktop;

pub use desktop::NotifyWatchBackend;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeWatchBackend;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to start watcher on {path}: {source}")]
    Start {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
    #[error("watch channel closed")]
    ChannelClosed,
}

/// Kind of filesystem change the underlying OS watcher reported, collapsed to the
/// two kinds the rest of the pipeline cares about: a rename is surfaced as `Changed`
/// on the new path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEventKind {
    Created,
    Changed,
}

#[derive(Debug, Clone)]
pub struct RawWatchEvent {
    pub path: PathBuf,
    pub kind: RawEventKind,
}

/// A single running watch over one directory. Dropping it stops the native watcher.
#[async_trait]
pub trait WatchBackend: Send + Sync + 'static {
    /// Begin watching `root` (recursively iff `recursive`), delivering raw events
    /// over the returned channel until the handle is dropped or `stop` is called.
    async fn watch(
        &self,
        root: &Path,
        recursive: bool,
    ) -> Result<(Box<dyn WatchHandle>, tokio::sync::mpsc::Receiver<RawWatchEvent>), WatchError>;
}

/// Handle to a single active watch; dropping or calling `stop` releases the native
/// watcher resources.
#[async_trait]
pub trait WatchHandle: Send + Sync {
    fn stop(&self);
}
