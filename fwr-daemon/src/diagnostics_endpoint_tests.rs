// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::debounce::Debouncer;
use filewatchrest_adapters::FakeWatchBackend;
use filewatchrest_core::{Configuration, SystemClock};
use std::time::Duration;
use tower::ServiceExt;

fn empty_state() -> Arc<DiagnosticsState> {
    let backend = Arc::new(FakeWatchBackend::new());
    let debouncer = Arc::new(Debouncer::new(Duration::from_millis(10), Arc::new(SystemClock)));
    let (_tx, rx) = tokio::sync::watch::channel(Arc::new(test_config()));
    let diagnostics = Arc::new(Mutex::new(DiagnosticsRing::new()));
    let supervisor = Arc::new(WatcherSupervisor::new(backend, debouncer, rx, Arc::clone(&diagnostics)));
    Arc::new(DiagnosticsState {
        diagnostics,
        circuit: Arc::new(CircuitRegistry::new()),
        supervisor,
    })
}

fn test_config() -> Configuration {
    use std::collections::BTreeSet;
    Configuration {
        folders: BTreeSet::from([std::path::PathBuf::from("/watched")]),
        api_endpoint: url::Url::parse("https://example.com/notify").expect("url"),
        bearer_token: None,
        post_file_contents: false,
        move_processed_files: false,
        processed_folder: "processed".to_string(),
        allowed_extensions: BTreeSet::new(),
        include_subdirectories: false,
        debounce_ms: 0,
        retries: 0,
        retry_delay_ms: 1,
        channel_capacity: 16,
        max_parallel_sends: 1,
        watcher_max_restart_attempts: 5,
        watcher_restart_delay_ms: 1,
        wait_for_file_ready_ms: 0,
        max_content_bytes: 1024,
        streaming_threshold_bytes: 512,
        enable_circuit_breaker: false,
        circuit_breaker_failure_threshold: 2,
        circuit_breaker_open_duration_ms: 1000,
        diagnostics_url_prefix: url::Url::parse("http://127.0.0.1:5005").expect("url"),
        logging: filewatchrest_core::LoggingConfig::default(),
    }
}

#[tokio::test]
async fn health_reports_healthy() {
    let state = empty_state();
    let response = health().await.into_response();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(json["status"], "healthy");
    drop(state);
}

#[tokio::test]
async fn status_reports_empty_diagnostics_and_watchers() {
    let state = empty_state();
    let response = status(State(state)).await.into_response();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(json["activeWatchers"].as_array().expect("array").len(), 0);
    assert_eq!(json["eventCount"], 0);
    assert_eq!(json["totalEvents"], 0);
}

#[tokio::test]
async fn events_reflects_ring_contents_newest_first() {
    let state = empty_state();
    state.diagnostics.lock().push(DiagnosticEventRecord {
        path: std::path::PathBuf::from("/watched/a.txt"),
        timestamp: Utc::now(),
        posted_success: true,
        status_code: Some(200),
    });
    state.diagnostics.lock().push(DiagnosticEventRecord {
        path: std::path::PathBuf::from("/watched/b.txt"),
        timestamp: Utc::now(),
        posted_success: false,
        status_code: Some(500),
    });

    let response = events(State(state)).await.into_response();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
    let arr = json.as_array().expect("array");
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["path"], "/watched/b.txt");
}

#[tokio::test]
async fn unknown_route_returns_404_with_endpoint_listing() {
    let app = router(empty_state());
    let response = app
        .oneshot(
            axum::http::Request::builder()
                .uri("/nope")
                .body(axum::body::Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_some());
}
