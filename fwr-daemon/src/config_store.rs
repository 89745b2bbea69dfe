// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config Store: loads, validates, and publishes `Configuration` snapshots, and
//! watches the configuration file for changes, debouncing rapid bursts to a
//! single reload attempt.
//!
//! Subscribers hold a `tokio::sync::watch::Receiver<Arc<Configuration>>` and
//! swap their local reference atomically rather than mutating in place — the
//! same publish/subscribe-of-immutable-snapshots idiom the Debounce Coalescer
//! uses for timers.

use filewatchrest_core::{Configuration, RawConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error(transparent)]
    Config(#[from] filewatchrest_core::ConfigError),
    #[error("failed to watch configuration file {path}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// Default quiet period for coalescing rapid configuration-file change bursts
/// into one reload.
pub const DEFAULT_RELOAD_DEBOUNCE: Duration = Duration::from_millis(400);

pub struct ConfigStore {
    path: PathBuf,
    tx: watch::Sender<Arc<Configuration>>,
    rx: watch::Receiver<Arc<Configuration>>,
}

impl ConfigStore {
    /// Loads and validates the configuration at `path`, failing fatally on any
    /// `ConfigError` — the one error class allowed to terminate the process at
    /// startup.
    pub fn load(path: PathBuf) -> Result<Self, ConfigStoreError> {
        let config = Arc::new(RawConfig::from_json(&path)?.validate()?);
        let (tx, rx) = watch::channel(config);
        Ok(Self { path, tx, rx })
    }

    pub fn current(&self) -> Arc<Configuration> {
        self.rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Configuration>> {
        self.rx.clone()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Attempts to reload from disk and publish the new snapshot. On failure,
    /// the previous snapshot is retained and the error is returned to the
    /// caller for logging — reload failures are never fatal.
    pub fn try_reload(&self) -> Result<(), ConfigStoreError> {
        let config = RawConfig::from_json(&self.path)?.validate()?;
        let _ = self.tx.send(Arc::new(config));
        Ok(())
    }

    /// Watches the configuration file for changes until `cancel` fires,
    /// debouncing bursts to `debounce` and calling `try_reload` on each fired
    /// debounce. Reload errors are swallowed here (the previous snapshot is
    /// kept); callers that want to observe failures should call `try_reload`
    /// directly instead.
    pub async fn watch(
        self: Arc<Self>,
        debounce: Duration,
        cancel: CancellationToken,
    ) -> Result<(), ConfigStoreError> {
        use notify::{RecursiveMode, Watcher as NotifyWatcher};

        let (raw_tx, mut raw_rx) = tokio::sync::mpsc::channel(64);
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            if res.is_ok() {
                let _ = raw_tx.try_send(());
            }
        })
        .map_err(|source| ConfigStoreError::Watch {
            path: self.path.clone(),
            source,
        })?;

        let watch_target = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        watcher
            .watch(&watch_target, RecursiveMode::NonRecursive)
            .map_err(|source| ConfigStoreError::Watch {
                path: self.path.clone(),
                source,
            })?;

        let mut pending = false;
        loop {
            let sleep = if pending {
                debounce
            } else {
                Duration::from_secs(3600)
            };

            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                got = raw_rx.recv() => {
                    if got.is_none() {
                        return Ok(());
                    }
                    pending = true;
                }
                _ = tokio::time::sleep(sleep), if pending => {
                    pending = false;
                    if let Err(err) = self.try_reload() {
                        tracing::warn!(path = %self.path.display(), error = %err, "configuration reload failed, keeping previous snapshot");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "config_store_tests.rs"]
mod tests;
