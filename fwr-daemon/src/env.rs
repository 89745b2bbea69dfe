// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access and configuration-path resolution
//! for the daemon crate: CLI flag > first positional (if it exists as a
//! file) > `FILEWATCHREST_CONFIG` > platform default under common app data.

use std::path::PathBuf;

pub const CONFIG_ENV_VAR: &str = "FILEWATCHREST_CONFIG";

/// Reads `FILEWATCHREST_CONFIG` from the environment.
pub fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from)
}

/// Platform-specific default configuration path under the user's
/// application-data directory, e.g. `~/.config/filewatchrest/config.json` on
/// Linux, `~/Library/Application Support/filewatchrest/config.json` on macOS.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("filewatchrest")
        .join("config.json")
}

/// Resolves the configuration file path by precedence: an explicit
/// `--config`/`-c` flag wins outright; otherwise a positional argument is used
/// only if it names a file that exists; otherwise the environment variable;
/// otherwise the platform default.
pub fn resolve_config_path(flag: Option<PathBuf>, positional: Option<PathBuf>) -> PathBuf {
    if let Some(path) = flag {
        return path;
    }
    if let Some(path) = positional {
        if path.is_file() {
            return path;
        }
    }
    if let Some(path) = config_path_from_env() {
        return path;
    }
    default_config_path()
}

/// `RUST_LOG`, if set, takes precedence over the configuration file's
/// `logging.level` when initializing `tracing-subscriber`'s env-filter.
pub fn rust_log_override() -> Option<String> {
    std::env::var("RUST_LOG").ok().filter(|s| !s.is_empty())
}

/// Reconciles the env-filter directive to use at startup: `RUST_LOG` wins,
/// otherwise the configured log level, otherwise `Path::exists` plays no role
/// here — this is a pure precedence function with no I/O.
pub fn effective_log_directive(configured_level: &str) -> String {
    rust_log_override().unwrap_or_else(|| configured_level.to_string())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
