// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator: composes the Config Store, Watcher Supervisor, Debounce
//! Coalescer, Work Queue, Sender Pool, and Diagnostics Endpoint into the
//! running pipeline, and reconciles watchers and pool sizing on every
//! configuration change.
//!
//! Data flow: Watcher -> Debouncer -> Work Queue -> Sender Pool -> HTTP
//! Resilience Sender -> Archive. The orchestrator owns every background
//! task's `JoinHandle` so `stop`/`join` can wait for a clean shutdown.

use crate::circuit_registry::CircuitRegistry;
use crate::config_store::{ConfigStore, ConfigStoreError, DEFAULT_RELOAD_DEBOUNCE};
use crate::debounce::Debouncer;
use crate::diagnostics_endpoint::{self, DiagnosticsState};
use crate::queue::{self, QueueProducer};
use crate::resilience::ResilienceSender;
use crate::sender_pool::{FileReader, SenderPool, SenderPoolDeps, TokioFileReader};
use crate::watcher_supervisor::WatcherSupervisor;
use filewatchrest_adapters::{FolderAction, HttpTransport, NoOpFolderAction, WatchBackend};
use filewatchrest_core::{Clock, Configuration, DiagnosticsRing, FileEvent, SystemClock};
use parking_lot::Mutex;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    ConfigStore(#[from] ConfigStoreError),
}

/// External collaborators the orchestrator wires together; swappable for
/// fakes in tests.
pub struct OrchestratorDeps {
    pub watch_backend: Arc<dyn WatchBackend>,
    pub http_transport: Arc<dyn HttpTransport>,
    pub folder_action: Arc<dyn FolderAction>,
    pub file_reader: Arc<dyn FileReader>,
    pub clock: Arc<dyn Clock>,
    pub computer_name: String,
}

impl OrchestratorDeps {
    /// Real collaborators: the native `notify` watcher, a `reqwest` transport,
    /// the no-op folder action, `tokio::fs` reads, the system clock, and the
    /// local host name.
    pub fn production(http_transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            watch_backend: Arc::new(filewatchrest_adapters::NotifyWatchBackend::new()),
            http_transport,
            folder_action: Arc::new(NoOpFolderAction::new()),
            file_reader: Arc::new(TokioFileReader),
            clock: Arc::new(SystemClock),
            computer_name: hostname::get()
                .ok()
                .and_then(|h| h.into_string().ok())
                .unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

/// The running pipeline, with every component it owns.
pub struct Orchestrator {
    config_store: Arc<ConfigStore>,
    supervisor: Arc<WatcherSupervisor>,
    sender_pool: Arc<SenderPool>,
    diagnostics: Arc<Mutex<DiagnosticsRing>>,
    circuit: Arc<CircuitRegistry>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Orchestrator {
    /// Builds every component from `config_store`'s current snapshot, starts
    /// watchers for its folders, and spawns the background tasks: the
    /// debounce-to-queue bridge, reconciliation on config reload, the
    /// configuration file watch, and the diagnostics endpoint. Returns once
    /// everything is running.
    pub fn start(
        config_store: Arc<ConfigStore>,
        deps: OrchestratorDeps,
        cancel: CancellationToken,
    ) -> Result<Self, OrchestratorError> {
        let initial = config_store.current();
        let config_rx = config_store.subscribe();

        let diagnostics = Arc::new(Mutex::new(DiagnosticsRing::new()));
        let circuit = Arc::new(CircuitRegistry::new());

        let debouncer = Arc::new(Debouncer::new(
            Duration::from_millis(initial.debounce_ms),
            Arc::clone(&deps.clock),
        ));

        let supervisor = Arc::new(WatcherSupervisor::new(
            Arc::clone(&deps.watch_backend),
            Arc::clone(&debouncer),
            config_rx.clone(),
            Arc::clone(&diagnostics),
        ));
        supervisor.reconcile(&initial);

        let (producer, consumer) = queue::work_queue(initial.channel_capacity);
        let (debounced_tx, debounced_rx) = mpsc::channel::<FileEvent>(initial.channel_capacity.max(1));

        let mut tasks = Vec::new();
        tasks.push(tokio::spawn(
            Arc::clone(&debouncer).run(debounced_tx, cancel.clone()),
        ));
        tasks.push(tokio::spawn(bridge_to_queue(
            debounced_rx,
            producer,
            cancel.clone(),
        )));

        let resilience = Arc::new(ResilienceSender::new(
            Arc::clone(&deps.http_transport),
            Arc::clone(&circuit),
            Arc::clone(&deps.clock),
        ));
        let sender_pool = Arc::new(SenderPool::new(
            consumer,
            config_rx.clone(),
            SenderPoolDeps {
                reader: Arc::clone(&deps.file_reader),
                resilience,
                action: Arc::clone(&deps.folder_action),
                diagnostics: Arc::clone(&diagnostics),
                computer_name: deps.computer_name.clone(),
            },
            cancel.clone(),
        ));
        sender_pool.resize(initial.max_parallel_sends);

        tasks.push(tokio::spawn(reconcile_on_change(
            config_rx,
            Arc::clone(&supervisor),
            Arc::clone(&sender_pool),
            cancel.clone(),
        )));

        tasks.push(tokio::spawn({
            let config_store = Arc::clone(&config_store);
            let cancel = cancel.clone();
            async move {
                if let Err(err) = config_store.watch(DEFAULT_RELOAD_DEBOUNCE, cancel).await {
                    tracing::warn!(error = %err, "configuration file watch stopped");
                }
            }
        }));

        match diagnostics_addr(&initial.diagnostics_url_prefix) {
            Some(addr) => {
                let state = Arc::new(DiagnosticsState {
                    diagnostics: Arc::clone(&diagnostics),
                    circuit: Arc::clone(&circuit),
                    supervisor: Arc::clone(&supervisor),
                });
                let cancel = cancel.clone();
                tasks.push(tokio::spawn(async move {
                    // A bind failure here is reported but never stops the
                    // pipeline: the rest of the components keep running
                    // without a diagnostics surface.
                    if let Err(err) = diagnostics_endpoint::serve(addr, state, cancel).await {
                        tracing::error!(error = %err, "diagnostics endpoint failed to start");
                    }
                }));
            }
            None => {
                tracing::warn!(
                    url = %initial.diagnostics_url_prefix,
                    "diagnostics endpoint URL has no resolvable host/port, endpoint disabled"
                );
            }
        }

        Ok(Self {
            config_store,
            supervisor,
            sender_pool,
            diagnostics,
            circuit,
            cancel,
            tasks: Mutex::new(tasks),
        })
    }

    pub fn config_store(&self) -> &Arc<ConfigStore> {
        &self.config_store
    }

    pub fn supervisor(&self) -> &Arc<WatcherSupervisor> {
        &self.supervisor
    }

    pub fn sender_pool(&self) -> &Arc<SenderPool> {
        &self.sender_pool
    }

    pub fn diagnostics(&self) -> &Arc<Mutex<DiagnosticsRing>> {
        &self.diagnostics
    }

    pub fn circuit(&self) -> &Arc<CircuitRegistry> {
        &self.circuit
    }

    /// Signals shutdown to every background task and stops the watcher
    /// supervisor and sender pool in place. Does not wait for tasks to
    /// finish; call `join` for that.
    pub fn stop(&self) {
        self.cancel.cancel();
        self.supervisor.stop();
        self.sender_pool.stop();
    }

    /// Waits for every background task to finish. Intended to be called after
    /// `stop`, as part of graceful shutdown.
    pub async fn join(self) {
        let tasks = self.tasks.into_inner();
        for task in tasks {
            let _ = task.await;
        }
    }
}

async fn bridge_to_queue(
    mut rx: mpsc::Receiver<FileEvent>,
    producer: QueueProducer,
    cancel: CancellationToken,
) {
    while let Some(event) = rx.recv().await {
        if producer.enqueue(event, &cancel).await.is_err() {
            return;
        }
    }
}

async fn reconcile_on_change(
    mut config_rx: watch::Receiver<Arc<Configuration>>,
    supervisor: Arc<WatcherSupervisor>,
    sender_pool: Arc<SenderPool>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            changed = config_rx.changed() => {
                if changed.is_err() {
                    return;
                }
            }
        }
        let config = config_rx.borrow_and_update().clone();
        supervisor.reconcile(&config);
        sender_pool.resize(config.max_parallel_sends);
    }
}

/// Resolves the diagnostics endpoint's bind address from its configured URL.
/// Returns `None` if the URL has no host or port (letting the caller disable
/// the endpoint rather than fail startup).
fn diagnostics_addr(url: &url::Url) -> Option<SocketAddr> {
    let host = url.host_str()?;
    let port = url.port_or_known_default()?;
    (host, port).to_socket_addrs().ok()?.next()
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
