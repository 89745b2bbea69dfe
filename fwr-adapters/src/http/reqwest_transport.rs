// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `reqwest`-backed transport. Small payloads go as a single JSON body; large
//! ones stream via multipart so the file is never fully buffered.

use super::{HttpTransport, OutboundBody, OutboundRequest, SendOutcome, TransportError};
use async_trait::async_trait;
use tokio_util::io::ReaderStream;

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<SendOutcome, TransportError> {
        let mut builder = self.client.post(request.url.clone());
        if let Some(bearer) = &request.bearer {
            builder = builder.header(reqwest::header::AUTHORIZATION, bearer.authorization_header());
        }

        builder = match request.body {
            OutboundBody::Metadata | OutboundBody::Inline(_) => builder.json(&request.json),
            OutboundBody::Streamed { path, len } => {
                let file = tokio::fs::File::open(&path).await.map_err(|source| {
                    TransportError::OpenStreamedFile {
                        path: path.clone(),
                        source,
                    }
                })?;
                let stream = ReaderStream::new(file);
                let file_part = reqwest::multipart::Part::stream_with_length(
                    reqwest::Body::wrap_stream(stream),
                    len,
                )
                .file_name(
                    path.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                );
                let metadata_part = reqwest::multipart::Part::text(request.json.to_string())
                    .mime_str("application/json")
                    .map_err(TransportError::Transport)?;
                let form = reqwest::multipart::Form::new()
                    .part("metadata", metadata_part)
                    .part("file", file_part);
                builder.multipart(form)
            }
        };

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Transport(e)
            }
        })?;

        Ok(SendOutcome {
            status: response.status().as_u16(),
        })
    }
}

#[cfg(test)]
#[path = "reqwest_transport_tests.rs"]
mod tests;
