// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diagnostics HTTP Endpoint: a read-only `axum` listener serving `/`, `/status`,
//! `/health`, `/events`, and `/watchers` from in-memory snapshots. Never blocks
//! on the pipeline — every handler takes a short-lived lock, clones, and
//! returns.

use crate::circuit_registry::CircuitRegistry;
use crate::watcher_supervisor::WatcherSupervisor;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use filewatchrest_core::{DiagnosticEventRecord, DiagnosticsRing};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

pub struct DiagnosticsState {
    pub diagnostics: Arc<Mutex<DiagnosticsRing>>,
    pub circuit: Arc<CircuitRegistry>,
    pub supervisor: Arc<WatcherSupervisor>,
}

#[derive(Serialize)]
struct StatusResponse {
    active_watchers: Vec<String>,
    restart_attempts: HashMap<String, u32>,
    recent_events: Vec<DiagnosticEventRecord>,
    timestamp: DateTime<Utc>,
    event_count: usize,
    circuit_states: HashMap<String, bool>,
    total_events: u64,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct WatchersResponse {
    watchers: Vec<String>,
}

#[derive(Serialize)]
struct NotFoundResponse {
    error: &'static str,
    available_endpoints: &'static [&'static str],
}

const AVAILABLE_ENDPOINTS: &[&str] = &["/", "/status", "/health", "/events", "/watchers"];

async fn status(State(state): State<Arc<DiagnosticsState>>) -> impl IntoResponse {
    let now = std::time::Instant::now();
    let paths = state.supervisor.active_paths();
    let active_watchers: Vec<String> = paths
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    let restart_attempts: HashMap<String, u32> = paths
        .iter()
        .map(|p| {
            (
                p.to_string_lossy().into_owned(),
                state.supervisor.restart_count(p).unwrap_or(0),
            )
        })
        .collect();

    let ring = state.diagnostics.lock();
    let recent_events = ring.newest_first();
    let event_count = ring.len();
    let total_events = ring.total_appended();
    drop(ring);

    let circuit_states = state.circuit.snapshot(now);

    Json(StatusResponse {
        active_watchers,
        restart_attempts,
        recent_events,
        timestamp: Utc::now(),
        event_count,
        circuit_states,
        total_events,
    })
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now(),
    })
}

async fn events(State(state): State<Arc<DiagnosticsState>>) -> impl IntoResponse {
    Json(state.diagnostics.lock().newest_first())
}

async fn watchers(State(state): State<Arc<DiagnosticsState>>) -> impl IntoResponse {
    Json(WatchersResponse {
        watchers: state
            .supervisor
            .active_paths()
            .into_iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect(),
    })
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            error: "not found",
            available_endpoints: AVAILABLE_ENDPOINTS,
        }),
    )
}

fn router(state: Arc<DiagnosticsState>) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/status", get(status))
        .route("/health", get(health))
        .route("/events", get(events))
        .route("/watchers", get(watchers))
        .fallback(not_found)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .with_state(state)
}

#[derive(Debug, thiserror::Error)]
pub enum DiagnosticsEndpointError {
    #[error("failed to bind diagnostics endpoint on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Serves the diagnostics router on `addr` until `cancel` fires. A bind
/// failure is reported to the caller but never terminates the pipeline —
/// callers should log it and keep running without the endpoint.
pub async fn serve(
    addr: SocketAddr,
    state: Arc<DiagnosticsState>,
    cancel: CancellationToken,
) -> Result<(), DiagnosticsEndpointError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| DiagnosticsEndpointError::Bind { addr, source })?;

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|source| DiagnosticsEndpointError::Bind { addr, source })?;

    Ok(())
}

#[cfg(test)]
#[path = "diagnostics_endpoint_tests.rs"]
mod tests;
