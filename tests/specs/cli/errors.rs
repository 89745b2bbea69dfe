//! Startup error handling specs: bad configuration paths and payloads should
//! fail fast with a non-zero exit code and a message on stderr, never a panic.

use crate::prelude::*;

#[test]
fn missing_config_file_fails_with_message() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("does-not-exist.json");

    let output = run(&["--config", config_path.to_str().expect("utf8 path")]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("configuration"));
}

#[test]
fn invalid_json_config_fails_with_message() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, b"not json at all").expect("write");

    let output = run(&["--config", config_path.to_str().expect("utf8 path")]);

    assert!(!output.status.success());
}

#[test]
fn config_missing_required_folders_fails_validation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("config.json");
    let config = serde_json::json!({
        "folders": [],
        "apiEndpoint": "https://example.com/notify",
        "diagnosticsUrlPrefix": "http://127.0.0.1:0",
    });
    std::fs::write(&config_path, serde_json::to_vec(&config).expect("serialize")).expect("write");

    let output = run(&["--config", config_path.to_str().expect("utf8 path")]);

    assert!(!output.status.success());
}

#[test]
fn config_with_invalid_api_endpoint_fails_validation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("config.json");
    let watched = dir.path().join("watched");
    std::fs::create_dir_all(&watched).expect("mkdir");
    let config = serde_json::json!({
        "folders": [watched.to_string_lossy()],
        "apiEndpoint": "not-a-url",
        "diagnosticsUrlPrefix": "http://127.0.0.1:0",
    });
    std::fs::write(&config_path, serde_json::to_vec(&config).expect("serialize")).expect("write");

    let output = run(&["--config", config_path.to_str().expect("utf8 path")]);

    assert!(!output.status.success());
}
