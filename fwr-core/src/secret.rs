// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A bearer token wrapper that never leaks its value through `Debug`/`Display`.
//!
//! Decryption/decoding of the token at rest is handled externally; this type only
//! guards the decoded plaintext for the remainder of its lifetime in memory.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Serialize, Deserialize)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Renders the `Authorization` header value for this token.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.0)
    }

    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BearerToken").field(&"<redacted>").finish()
    }
}

impl PartialEq for BearerToken {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

#[cfg(test)]
#[path = "secret_tests.rs"]
mod tests;
