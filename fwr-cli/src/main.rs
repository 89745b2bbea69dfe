// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! filewatchrest: watches configured folders for new/changed files, debounces
//! them, and posts notifications to a remote HTTP endpoint with retries and
//! circuit-breaking. Run with no arguments to use the platform default
//! configuration path, or pass `--config`/`-c` (or a bare positional path) to
//! point at a specific file.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use filewatchrest_adapters::ReqwestTransport;
use filewatchrest_daemon::env;
use filewatchrest_daemon::{ConfigStore, Orchestrator, OrchestratorDeps};
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "filewatchrest", version, about = "Folder watcher and HTTP notifier")]
struct Cli {
    /// Path to the configuration file. Overrides FILEWATCHREST_CONFIG and the
    /// platform default.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Positional configuration path, used only if it names an existing file.
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let config_path = env::resolve_config_path(cli.config, cli.path);

    let config_store = match ConfigStore::load(config_path.clone()) {
        Ok(store) => Arc::new(store),
        Err(err) => {
            eprintln!("error: failed to load configuration from {}: {err}", config_path.display());
            return std::process::ExitCode::FAILURE;
        }
    };

    let _log_guard = setup_logging(&config_store.current().logging);
    info!(path = %config_path.display(), "loaded configuration");

    let http_client = reqwest::Client::builder()
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());
    let transport = Arc::new(ReqwestTransport::new(http_client));
    let deps = OrchestratorDeps::production(transport);

    let cancel = CancellationToken::new();
    let orchestrator = match Orchestrator::start(config_store, deps, cancel.clone()) {
        Ok(orchestrator) => orchestrator,
        Err(err) => {
            error!(error = %err, "failed to start");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!("filewatchrest running, press Ctrl-C to stop");
    wait_for_shutdown_signal().await;

    info!("shutting down");
    orchestrator.stop();
    orchestrator.join().await;
    info!("stopped");

    std::process::ExitCode::SUCCESS
}

/// Waits for SIGTERM or SIGINT (Ctrl-C). Falls back to `ctrl_c` alone if the
/// Unix signal handlers cannot be installed.
async fn wait_for_shutdown_signal() {
    let sigterm = signal(SignalKind::terminate());
    match sigterm {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = sigterm.recv() => info!("received SIGTERM"),
                _ = tokio::signal::ctrl_c() => info!("received SIGINT"),
            }
        }
        Err(err) => {
            error!(error = %err, "failed to install SIGTERM handler, watching for Ctrl-C only");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

fn setup_logging(
    logging: &filewatchrest_core::LoggingConfig,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let directive = env::effective_log_directive(&logging.level);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    match &logging.log_dir {
        Some(dir) => {
            if let Err(err) = std::fs::create_dir_all(dir) {
                eprintln!("warning: failed to create log directory {}: {err}", dir.display());
            }
            let file_appender = tracing_appender::rolling::never(dir, &logging.log_file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(non_blocking))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .init();
            None
        }
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
