// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sender Pool: a resizable set of workers that dequeue `FileEvent`s, build the
//! `Notification` payload, hand it to the HTTP Resilience Sender, archive the
//! file on success, and append a diagnostic record.
//!
//! Pool sizing is a live target rather than a fixed worker count: `resize`
//! updates the target and spawns workers up to it; a worker whose index has
//! fallen at or above the target exits once it finishes its current event,
//! so workers above a newly-lowered limit terminate only after finishing
//! whatever they were already sending.

use crate::archive;
use crate::queue::QueueConsumer;
use crate::resilience::{ResilienceConfig, ResilienceSender};
use async_trait::async_trait;
use filewatchrest_adapters::{FolderAction, OutboundBody, OutboundRequest};
use filewatchrest_core::{
    BearerToken, Configuration, DiagnosticEventRecord, DiagnosticsRing, FileEvent, Notification,
    NotificationBody,
};
use parking_lot::Mutex as SyncMutex;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Reads file metadata and content off disk. Abstracted so tests can exercise
/// the pool without touching the real filesystem.
#[async_trait]
pub trait FileReader: Send + Sync + 'static {
    async fn read(&self, path: &Path) -> std::io::Result<FileSnapshot>;
}

#[derive(Debug, Clone)]
pub struct FileSnapshot {
    pub size: u64,
    pub last_write_time: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Default)]
pub struct TokioFileReader;

#[async_trait]
impl FileReader for TokioFileReader {
    async fn read(&self, path: &Path) -> std::io::Result<FileSnapshot> {
        let metadata = tokio::fs::metadata(path).await?;
        let modified = metadata.modified().unwrap_or(std::time::SystemTime::now());
        Ok(FileSnapshot {
            size: metadata.len(),
            last_write_time: modified.into(),
        })
    }
}

/// Waits up to `timeout` for `path` to become openable for shared read, polling
/// at a short fixed interval. Returns `true` if the file became ready (or the
/// timeout is zero, a no-op pass-through), `false` if the deadline elapsed.
pub async fn wait_for_file_ready(path: &Path, timeout: Duration, cancel: &CancellationToken) -> bool {
    if timeout.is_zero() {
        return true;
    }
    const POLL_INTERVAL: Duration = Duration::from_millis(20);
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if tokio::fs::File::open(path).await.is_ok() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::select! {
            _ = cancel.cancelled() => return false,
            _ = tokio::time::sleep(POLL_INTERVAL.min(deadline.saturating_duration_since(tokio::time::Instant::now()))) => {}
        }
    }
}

pub struct SenderPoolDeps {
    pub reader: Arc<dyn FileReader>,
    pub resilience: Arc<ResilienceSender>,
    pub action: Arc<dyn FolderAction>,
    pub diagnostics: Arc<SyncMutex<DiagnosticsRing>>,
    pub computer_name: String,
}

struct Shared {
    consumer: AsyncMutex<QueueConsumer>,
    config: tokio::sync::watch::Receiver<Arc<Configuration>>,
    deps: SenderPoolDeps,
    target: AtomicUsize,
    cancel: CancellationToken,
}

/// A resizable pool of sender workers.
pub struct SenderPool {
    shared: Arc<Shared>,
    next_index: AtomicUsize,
    workers: SyncMutex<Vec<JoinHandle<()>>>,
}

impl SenderPool {
    pub fn new(
        consumer: QueueConsumer,
        config: tokio::sync::watch::Receiver<Arc<Configuration>>,
        deps: SenderPoolDeps,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                consumer: AsyncMutex::new(consumer),
                config,
                deps,
                target: AtomicUsize::new(0),
                cancel,
            }),
            next_index: AtomicUsize::new(0),
            workers: SyncMutex::new(Vec::new()),
        }
    }

    /// Current target worker count.
    pub fn target_size(&self) -> usize {
        self.shared.target.load(Ordering::SeqCst)
    }

    /// Sets the desired worker count. Spawns workers up to `n` immediately;
    /// workers above `n` self-terminate once their in-flight event completes.
    pub fn resize(&self, n: usize) {
        self.shared.target.store(n, Ordering::SeqCst);
        let mut workers = self.workers.lock();
        workers.retain(|h| !h.is_finished());
        while workers.len() < n {
            let index = self.next_index.fetch_add(1, Ordering::SeqCst);
            let shared = Arc::clone(&self.shared);
            workers.push(tokio::spawn(worker_loop(index, shared)));
        }
    }

    pub fn stop(&self) {
        self.shared.cancel.cancel();
    }
}

async fn worker_loop(index: usize, shared: Arc<Shared>) {
    loop {
        if index >= shared.target.load(Ordering::SeqCst) {
            return;
        }

        let event = {
            let mut consumer = shared.consumer.lock().await;
            tokio::select! {
                _ = shared.cancel.cancelled() => return,
                ev = consumer.dequeue() => ev,
            }
        };

        let Some(event) = event else { return };
        let config = shared.config.borrow().clone();
        process_event(event, &config, &shared.deps, &shared.cancel).await;

        if index >= shared.target.load(Ordering::SeqCst) {
            return;
        }
    }
}

async fn process_event(
    event: FileEvent,
    config: &Configuration,
    deps: &SenderPoolDeps,
    cancel: &CancellationToken,
) {
    if config.wait_for_file_ready_ms > 0 {
        wait_for_file_ready(
            &event.path,
            Duration::from_millis(config.wait_for_file_ready_ms),
            cancel,
        )
        .await;
    }

    let snapshot = match deps.reader.read(&event.path).await {
        Ok(s) => s,
        Err(_) => {
            // File vanished (or became unreadable) before we could build the
            // notification: drop the event with a diagnostic, no send attempt.
            record(deps, &event.path, false, None);
            return;
        }
    };

    let body = resolve_body(config, &event.path, snapshot.size).await;
    let notification = Notification {
        path: event.path.clone(),
        body,
        computer_name: deps.computer_name.clone(),
        file_size: snapshot.size,
        last_write_time: snapshot.last_write_time,
    };

    let endpoint_key = config.api_endpoint.as_str().to_string();
    let resilience_config = ResilienceConfig {
        retries: config.retries,
        retry_delay: Duration::from_millis(config.retry_delay_ms),
        enable_circuit_breaker: config.enable_circuit_breaker,
        circuit_breaker_failure_threshold: config.circuit_breaker_failure_threshold,
        circuit_breaker_open_duration: Duration::from_millis(config.circuit_breaker_open_duration_ms),
    };

    let url = config.api_endpoint.clone();
    let bearer = config.bearer_token.clone();
    let result = deps
        .resilience
        .send(&endpoint_key, &resilience_config, cancel, move || {
            build_request(&notification, url.clone(), bearer.clone())
        })
        .await;

    if result.success {
        if config.move_processed_files {
            if let Err(err) = archive::move_to_processed(&event.path, &config.processed_folder) {
                tracing::warn!(path = %event.path.display(), error = %err, "archive move failed");
            }
        }
        if let Err(err) = deps.action.run(&event.path).await {
            tracing::warn!(path = %event.path.display(), error = %err, "folder action failed");
        }
    }

    record(deps, &event.path, result.success, result.status_code);
}

async fn resolve_body(config: &Configuration, path: &Path, file_size: u64) -> NotificationBody {
    if !config.post_file_contents || file_size > config.max_content_bytes {
        return NotificationBody::Omitted;
    }
    if file_size > config.streaming_threshold_bytes {
        return NotificationBody::Streamed(path.to_path_buf());
    }
    match tokio::fs::read(path).await {
        Ok(bytes) => NotificationBody::Inline(bytes),
        Err(_) => NotificationBody::Omitted,
    }
}

fn build_request(
    notification: &Notification,
    url: url::Url,
    bearer: Option<BearerToken>,
) -> OutboundRequest {
    let json = serde_json::to_value(notification.inline_wire_body())
        .unwrap_or(serde_json::Value::Null);
    let body = match &notification.body {
        NotificationBody::Omitted | NotificationBody::Inline(_) => OutboundBody::Metadata,
        NotificationBody::Streamed(path) => OutboundBody::Streamed {
            path: path.clone(),
            len: notification.file_size,
        },
    };
    OutboundRequest {
        url,
        bearer,
        json,
        body,
    }
}

fn record(deps: &SenderPoolDeps, path: &Path, posted_success: bool, status_code: Option<u16>) {
    deps.diagnostics.lock().push(DiagnosticEventRecord {
        path: path.to_path_buf(),
        timestamp: chrono::Utc::now(),
        posted_success,
        status_code,
    });
}

#[cfg(test)]
#[path = "sender_pool_tests.rs"]
mod tests;
