//! Test helpers for behavioral specifications.
//!
//! Provides a high-level DSL for spawning the `filewatchrest` binary against
//! a scratch configuration file and polling its diagnostics endpoint.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::time::Duration;

pub const POLL_INTERVAL_MS: u64 = 20;
pub const POLL_MAX_MS: u64 = 3000;

fn binary_path() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let standard = manifest_dir.join("target/debug/filewatchrest");
    if standard.exists() {
        return standard;
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join("filewatchrest");
            if fallback.exists() {
                return fallback;
            }
        }
    }
    standard
}

pub fn cmd() -> Command {
    Command::new(binary_path())
}

/// Run the binary to completion (it must exit on its own, e.g. `--help` or a
/// startup failure) and capture output. For plain, non-async specs only.
pub fn run(args: &[&str]) -> Output {
    cmd().args(args).output().expect("command should run")
}

/// Poll an async `condition` until it returns true or `POLL_MAX_MS` elapses.
pub async fn wait_for<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(POLL_MAX_MS);
    let interval = Duration::from_millis(POLL_INTERVAL_MS);
    while start.elapsed() < timeout {
        if condition().await {
            return true;
        }
        tokio::time::sleep(interval).await;
    }
    false
}

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .expect("bind ephemeral port")
        .local_addr()
        .expect("local addr")
        .port()
}

/// A running `filewatchrest` process wired to a scratch config and watched
/// folder. Killed on drop.
pub struct Daemon {
    child: Child,
    pub watched: PathBuf,
    pub diagnostics_port: u16,
    config_path: PathBuf,
    http: reqwest::Client,
    _dir: tempfile::TempDir,
}

impl Daemon {
    /// Starts the daemon against a config posting to `api_endpoint`, waiting
    /// until its diagnostics endpoint answers `/health`.
    pub async fn start(api_endpoint: &str) -> Self {
        Self::start_with(api_endpoint, |_| {}).await
    }

    /// Starts the daemon, allowing the caller to mutate the config JSON
    /// before it is written.
    pub async fn start_with(api_endpoint: &str, edit: impl FnOnce(&mut serde_json::Value)) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let watched = dir.path().join("watched");
        std::fs::create_dir_all(&watched).expect("mkdir watched");
        let diagnostics_port = free_port();

        let mut config = serde_json::json!({
            "folders": [watched.to_string_lossy()],
            "apiEndpoint": api_endpoint,
            "diagnosticsUrlPrefix": format!("http://127.0.0.1:{diagnostics_port}"),
            "debounceMs": 20,
            "channelCapacity": 32,
            "maxParallelSends": 2,
            "moveProcessedFiles": false,
        });
        edit(&mut config);

        let config_path = dir.path().join("config.json");
        std::fs::write(
            &config_path,
            serde_json::to_vec_pretty(&config).expect("serialize config"),
        )
        .expect("write config");

        let child = cmd()
            .arg("--config")
            .arg(&config_path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn filewatchrest");

        let daemon = Self {
            child,
            watched,
            diagnostics_port,
            config_path,
            http: reqwest::Client::new(),
            _dir: dir,
        };
        assert!(
            wait_for(|| daemon.health_ok()).await,
            "diagnostics endpoint never became healthy"
        );
        daemon
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Overwrites the config file on disk with `edit` applied to the
    /// currently-written JSON.
    pub fn rewrite_config(&self, edit: impl FnOnce(&mut serde_json::Value)) {
        let mut config: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&self.config_path).expect("read config"))
                .expect("parse config");
        edit(&mut config);
        std::fs::write(
            &self.config_path,
            serde_json::to_vec_pretty(&config).expect("serialize config"),
        )
        .expect("rewrite config");
    }

    fn diagnostics_url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.diagnostics_port, path)
    }

    async fn health_ok(&self) -> bool {
        self.http
            .get(self.diagnostics_url("/health"))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    /// Fetches and parses `/status`.
    pub async fn status(&self) -> serde_json::Value {
        self.http
            .get(self.diagnostics_url("/status"))
            .send()
            .await
            .expect("status request")
            .json()
            .await
            .expect("status json")
    }

    /// Fetches and parses `/events`.
    pub async fn events(&self) -> serde_json::Value {
        self.http
            .get(self.diagnostics_url("/events"))
            .send()
            .await
            .expect("events request")
            .json()
            .await
            .expect("events json")
    }

    /// Writes `contents` to `name` inside the watched folder.
    pub fn drop_file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.watched.join(name);
        std::fs::write(&path, contents).expect("write watched file");
        path
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
