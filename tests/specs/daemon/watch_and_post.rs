//! End-to-end specs: dropping a file into a watched folder results in an
//! HTTP POST to the configured endpoint and a recorded diagnostics event.

use crate::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn new_file_is_posted_to_the_configured_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notify"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let daemon = Daemon::start(&format!("{}/notify", server.uri())).await;
    daemon.drop_file("a.txt", b"hello world");

    let received = wait_for(|| async { !server.received_requests().await.unwrap().is_empty() }).await;
    assert!(received, "expected the mock endpoint to receive a request");

    let events = daemon.events().await;
    let arr = events.as_array().expect("events array");
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["posted_success"], true);
}

#[tokio::test]
async fn status_endpoint_reflects_the_watched_folder() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let daemon = Daemon::start(&format!("{}/notify", server.uri())).await;

    let status = daemon.status().await;
    let watched = status["active_watchers"].as_array().expect("watchers array");
    assert_eq!(watched.len(), 1);
    assert!(watched[0]
        .as_str()
        .expect("string")
        .contains(daemon.watched.file_name().expect("name").to_str().expect("utf8")));
}

#[tokio::test]
async fn unreachable_endpoint_is_recorded_as_a_failed_delivery() {
    // Port 1, nothing listening: connection refused.
    let daemon = Daemon::start("http://127.0.0.1:1/notify").await;
    daemon.drop_file("a.txt", b"hello world");

    let recorded = wait_for(|| async { !daemon.events().await.as_array().expect("array").is_empty() }).await;
    assert!(recorded, "expected a diagnostics record even on delivery failure");

    let events = daemon.events().await;
    let arr = events.as_array().expect("events array");
    assert_eq!(arr[0]["posted_success"], false);
}
