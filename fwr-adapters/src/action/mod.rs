// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Folder action adapter: a narrow trait boundary for pluggable post-send
//! behavior (external scripts/executables in the source system). The core only
//! defines the interface here; no process-spawning plugin loader exists.

mod noop;

pub use noop::NoOpFolderAction;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeFolderAction, FolderActionCall};

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FolderActionError {
    #[error("folder action failed: {0}")]
    Failed(String),
}

/// Invoked by the Sender Pool after a file has been processed, alongside (or
/// instead of) the HTTP send, mirroring the source system's pluggable
/// script/executable actions.
#[async_trait]
pub trait FolderAction: Send + Sync + 'static {
    async fn run(&self, path: &Path) -> Result<(), FolderActionError>;
}
