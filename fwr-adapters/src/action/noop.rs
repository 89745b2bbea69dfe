// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op folder action.

use super::{FolderAction, FolderActionError};
use async_trait::async_trait;
use std::path::Path;

/// Folder action that does nothing. Used when no action plugin is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpFolderAction;

impl NoOpFolderAction {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FolderAction for NoOpFolderAction {
    async fn run(&self, _path: &Path) -> Result<(), FolderActionError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
