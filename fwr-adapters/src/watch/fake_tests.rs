// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn push_delivers_to_matching_root() {
    let backend = FakeWatchBackend::new();
    let root = PathBuf::from("/watched");
    let (_handle, mut rx) = backend.watch(&root, true).await.expect("watch");

    backend
        .push(
            &root,
            RawWatchEvent {
                path: root.join("a.txt"),
                kind: RawEventKind::Created,
            },
        )
        .await;

    let event = rx.recv().await.expect("event");
    assert_eq!(event.path, root.join("a.txt"));
    assert_eq!(backend.watched_roots(), vec![root]);
}

#[tokio::test]
async fn push_to_unwatched_root_is_dropped_silently() {
    let backend = FakeWatchBackend::new();
    backend
        .push(
            Path::new("/nowhere"),
            RawWatchEvent {
                path: PathBuf::from("/nowhere/a.txt"),
                kind: RawEventKind::Created,
            },
        )
        .await;
}

#[tokio::test]
async fn stop_records_the_root_and_drops_the_sender() {
    let backend = FakeWatchBackend::new();
    let root = PathBuf::from("/watched");
    let (handle, _rx) = backend.watch(&root, true).await.expect("watch");

    handle.stop();

    assert_eq!(backend.stopped_roots(), vec![root.clone()]);
    backend
        .push(
            &root,
            RawWatchEvent {
                path: root.join("a.txt"),
                kind: RawEventKind::Created,
            },
        )
        .await;
}
