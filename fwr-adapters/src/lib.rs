// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! filewatchrest-adapters: boundary adapters (filesystem watch, HTTP transport,
//! processed-file actions) behind traits so the daemon crate can be driven by
//! fakes in tests.

pub mod action;
pub mod http;
pub mod watch;

pub use action::{FolderAction, FolderActionError, NoOpFolderAction};
pub use http::{HttpTransport, OutboundBody, OutboundRequest, ReqwestTransport, SendOutcome, TransportError};
pub use watch::{NotifyWatchBackend, RawEventKind, RawWatchEvent, WatchBackend, WatchError, WatchHandle};

#[cfg(any(test, feature = "test-support"))]
pub use action::{FakeFolderAction, FolderActionCall};
#[cfg(any(test, feature = "test-support"))]
pub use http::{FakeHttpTransport, RecordedRequest};
#[cfg(any(test, feature = "test-support"))]
pub use watch::FakeWatchBackend;
