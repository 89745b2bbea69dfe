// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request_to(url: url::Url) -> OutboundRequest {
    OutboundRequest {
        url,
        bearer: None,
        json: serde_json::json!({"Path": "/watched/a.txt"}),
        body: OutboundBody::Metadata,
    }
}

#[tokio::test]
async fn success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notify"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(reqwest::Client::new());
    let url = url::Url::parse(&format!("{}/notify", server.uri())).expect("url");
    let outcome = transport.send(request_to(url)).await.expect("send");
    assert_eq!(outcome.status, 200);
}

#[tokio::test]
async fn server_error_status_is_reported_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notify"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(reqwest::Client::new());
    let url = url::Url::parse(&format!("{}/notify", server.uri())).expect("url");
    let outcome = transport.send(request_to(url)).await.expect("send");
    assert_eq!(outcome.status, 503);
}

#[tokio::test]
async fn bearer_token_is_sent_as_authorization_header() {
    use filewatchrest_core::BearerToken;
    use wiremock::matchers::header;

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notify"))
        .and(header("authorization", "Bearer s3cr3t"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(reqwest::Client::new());
    let url = url::Url::parse(&format!("{}/notify", server.uri())).expect("url");
    let mut request = request_to(url);
    request.bearer = Some(BearerToken::new("s3cr3t".to_string()));
    let outcome = transport.send(request).await.expect("send");
    assert_eq!(outcome.status, 200);
}

#[tokio::test]
async fn streamed_body_uploads_file_without_buffering_in_the_request_builder() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file_path = dir.path().join("payload.bin");
    std::fs::write(&file_path, vec![7u8; 4096]).expect("write");

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notify"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(reqwest::Client::new());
    let url = url::Url::parse(&format!("{}/notify", server.uri())).expect("url");
    let mut request = request_to(url);
    request.body = OutboundBody::Streamed {
        path: file_path,
        len: 4096,
    };
    let outcome = transport.send(request).await.expect("send");
    assert_eq!(outcome.status, 200);
}
