// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake folder action for testing.

use super::{FolderAction, FolderActionError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct FolderActionCall {
    pub path: PathBuf,
}

struct FakeState {
    calls: Vec<FolderActionCall>,
    fail_next: bool,
}

#[derive(Clone)]
pub struct FakeFolderAction {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeFolderAction {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                calls: Vec::new(),
                fail_next: false,
            })),
        }
    }
}

impl FakeFolderAction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<FolderActionCall> {
        self.inner.lock().calls.clone()
    }

    /// Make the next `run` call fail; resets after firing once.
    pub fn fail_next_call(&self) {
        self.inner.lock().fail_next = true;
    }
}

#[async_trait]
impl FolderAction for FakeFolderAction {
    async fn run(&self, path: &Path) -> Result<(), FolderActionError> {
        let mut state = self.inner.lock();
        state.calls.push(FolderActionCall {
            path: path.to_path_buf(),
        });
        if state.fail_next {
            state.fail_next = false;
            return Err(FolderActionError::Failed("scripted failure".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
