// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration snapshot: the `RawConfig` deserialized from disk, validated into the
//! immutable `Configuration` every other component reads through a single accessor.

use crate::secret::BearerToken;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// On-disk JSON shape. Field names mirror the wire configuration file; validation
/// happens in [`RawConfig::validate`], which is the only way to obtain a
/// [`Configuration`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawConfig {
    pub folders: Vec<PathBuf>,
    #[serde(rename = "apiEndpoint")]
    pub api_endpoint: String,
    #[serde(rename = "bearerToken", default)]
    pub bearer_token: Option<String>,
    #[serde(rename = "postFileContents", default)]
    pub post_file_contents: bool,
    #[serde(rename = "moveProcessedFiles", default)]
    pub move_processed_files: bool,
    #[serde(rename = "processedFolder", default = "default_processed_folder")]
    pub processed_folder: String,
    #[serde(rename = "allowedExtensions", default)]
    pub allowed_extensions: BTreeSet<String>,
    #[serde(rename = "includeSubdirectories", default)]
    pub include_subdirectories: bool,
    #[serde(rename = "debounceMs", default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub retries: u32,
    #[serde(rename = "retryDelayMs", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(rename = "channelCapacity", default = "default_channel_capacity")]
    pub channel_capacity: usize,
    #[serde(rename = "maxParallelSends", default = "default_max_parallel_sends")]
    pub max_parallel_sends: usize,
    #[serde(rename = "watcherMaxRestartAttempts", default = "default_watcher_max_restart_attempts")]
    pub watcher_max_restart_attempts: u32,
    #[serde(rename = "watcherRestartDelayMs", default = "default_watcher_restart_delay_ms")]
    pub watcher_restart_delay_ms: u64,
    #[serde(rename = "waitForFileReadyMs", default)]
    pub wait_for_file_ready_ms: u64,
    #[serde(rename = "maxContentBytes", default = "default_max_content_bytes")]
    pub max_content_bytes: u64,
    #[serde(rename = "streamingThresholdBytes", default = "default_streaming_threshold_bytes")]
    pub streaming_threshold_bytes: u64,
    #[serde(rename = "enableCircuitBreaker", default)]
    pub enable_circuit_breaker: bool,
    #[serde(rename = "circuitBreakerFailureThreshold", default = "default_circuit_breaker_failure_threshold")]
    pub circuit_breaker_failure_threshold: u32,
    #[serde(rename = "circuitBreakerOpenDurationMs", default = "default_circuit_breaker_open_duration_ms")]
    pub circuit_breaker_open_duration_ms: u64,
    #[serde(rename = "diagnosticsUrlPrefix")]
    pub diagnostics_url_prefix: String,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_processed_folder() -> String {
    "processed".to_string()
}
fn default_debounce_ms() -> u64 {
    500
}
fn default_retry_delay_ms() -> u64 {
    1000
}
fn default_channel_capacity() -> usize {
    256
}
fn default_max_parallel_sends() -> usize {
    4
}
fn default_watcher_max_restart_attempts() -> u32 {
    5
}
fn default_watcher_restart_delay_ms() -> u64 {
    1000
}
fn default_max_content_bytes() -> u64 {
    10 * 1024 * 1024
}
fn default_streaming_threshold_bytes() -> u64 {
    1024 * 1024
}
fn default_circuit_breaker_failure_threshold() -> u32 {
    5
}
fn default_circuit_breaker_open_duration_ms() -> u64 {
    30_000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(rename = "logDir", default)]
    pub log_dir: Option<PathBuf>,
    #[serde(rename = "logFileName", default = "default_log_file_name")]
    pub log_file_name: String,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_file_name() -> String {
    "filewatchrest.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: None,
            log_file_name: default_log_file_name(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Validated, immutable configuration snapshot. Every component reads the current
/// one through a single accessor (the Config Store) and never mutates it in place.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub folders: BTreeSet<PathBuf>,
    pub api_endpoint: Url,
    pub bearer_token: Option<BearerToken>,
    pub post_file_contents: bool,
    pub move_processed_files: bool,
    pub processed_folder: String,
    pub allowed_extensions: BTreeSet<String>,
    pub include_subdirectories: bool,
    pub debounce_ms: u64,
    pub retries: u32,
    pub retry_delay_ms: u64,
    pub channel_capacity: usize,
    pub max_parallel_sends: usize,
    pub watcher_max_restart_attempts: u32,
    pub watcher_restart_delay_ms: u64,
    pub wait_for_file_ready_ms: u64,
    pub max_content_bytes: u64,
    pub streaming_threshold_bytes: u64,
    pub enable_circuit_breaker: bool,
    pub circuit_breaker_failure_threshold: u32,
    pub circuit_breaker_open_duration_ms: u64,
    pub diagnostics_url_prefix: Url,
    pub logging: LoggingConfig,
}

impl RawConfig {
    pub fn from_json(path: &std::path::Path) -> Result<RawConfig, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validate and convert into the immutable form the rest of the system consumes.
    pub fn validate(self) -> Result<Configuration, ConfigError> {
        if self.folders.is_empty() {
            return Err(ConfigError::Validation("folders must not be empty".into()));
        }

        let api_endpoint = Url::parse(&self.api_endpoint)
            .map_err(|e| ConfigError::Validation(format!("apiEndpoint is not a valid URL: {e}")))?;
        if api_endpoint.scheme() != "http" && api_endpoint.scheme() != "https" {
            return Err(ConfigError::Validation(
                "apiEndpoint must be an absolute http or https URL".into(),
            ));
        }

        let diagnostics_url_prefix = Url::parse(&self.diagnostics_url_prefix).map_err(|e| {
            ConfigError::Validation(format!("diagnosticsUrlPrefix is not a valid URL: {e}"))
        })?;

        if self.processed_folder.trim().is_empty() {
            return Err(ConfigError::Validation(
                "processedFolder must not be empty".into(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Validation(
                "channelCapacity must be at least 1".into(),
            ));
        }
        if self.max_parallel_sends == 0 {
            return Err(ConfigError::Validation(
                "maxParallelSends must be at least 1".into(),
            ));
        }
        if self.enable_circuit_breaker && self.circuit_breaker_failure_threshold == 0 {
            return Err(ConfigError::Validation(
                "circuitBreakerFailureThreshold must be at least 1".into(),
            ));
        }
        if self.enable_circuit_breaker && self.circuit_breaker_open_duration_ms == 0 {
            return Err(ConfigError::Validation(
                "circuitBreakerOpenDurationMs must be at least 1".into(),
            ));
        }
        match self.logging.level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::Validation(format!(
                    "logging.level must be one of trace/debug/info/warn/error, got {other:?}"
                )))
            }
        }

        let allowed_extensions = self
            .allowed_extensions
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .collect();

        let bearer_token = self
            .bearer_token
            .filter(|s| !s.is_empty())
            .map(BearerToken::new);

        Ok(Configuration {
            folders: self.folders.into_iter().collect(),
            api_endpoint,
            bearer_token,
            post_file_contents: self.post_file_contents,
            move_processed_files: self.move_processed_files,
            processed_folder: self.processed_folder,
            allowed_extensions,
            include_subdirectories: self.include_subdirectories,
            debounce_ms: self.debounce_ms,
            retries: self.retries,
            retry_delay_ms: self.retry_delay_ms,
            channel_capacity: self.channel_capacity,
            max_parallel_sends: self.max_parallel_sends,
            watcher_max_restart_attempts: self.watcher_max_restart_attempts,
            watcher_restart_delay_ms: self.watcher_restart_delay_ms,
            wait_for_file_ready_ms: self.wait_for_file_ready_ms,
            max_content_bytes: self.max_content_bytes,
            streaming_threshold_bytes: self.streaming_threshold_bytes,
            enable_circuit_breaker: self.enable_circuit_breaker,
            circuit_breaker_failure_threshold: self.circuit_breaker_failure_threshold,
            circuit_breaker_open_duration_ms: self.circuit_breaker_open_duration_ms,
            diagnostics_url_prefix,
            logging: self.logging,
        })
    }
}

impl Configuration {
    /// True iff `ext` (without a leading dot, any case) is allowed. An empty
    /// allow-list means every extension is allowed.
    pub fn extension_allowed(&self, ext: &str) -> bool {
        self.allowed_extensions.is_empty()
            || self
                .allowed_extensions
                .contains(&ext.to_ascii_lowercase())
    }

    /// True iff `path` sits beneath a directory segment equal to `processedFolder`.
    pub fn is_in_processed_folder(&self, path: &std::path::Path) -> bool {
        path.components().any(|c| {
            c.as_os_str()
                .to_str()
                .map(|s| s == self.processed_folder)
                .unwrap_or(false)
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
