// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use tempfile::tempdir;

#[tokio::test]
async fn detects_file_creation() {
    let dir = tempdir().expect("tempdir");
    let backend = NotifyWatchBackend::new();
    let (_handle, mut rx) = backend
        .watch(dir.path(), false)
        .await
        .expect("watch should start");

    std::fs::write(dir.path().join("new.txt"), b"hello").expect("write");

    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("should receive an event before timeout")
        .expect("channel should stay open");
    assert_eq!(event.kind, RawEventKind::Created);
}

#[tokio::test]
async fn stop_releases_the_native_watcher() {
    let dir = tempdir().expect("tempdir");
    let backend = NotifyWatchBackend::new();
    let (handle, _rx) = backend
        .watch(dir.path(), false)
        .await
        .expect("watch should start");
    handle.stop();
    // No panic or hang on drop after an explicit stop.
}
