//! CLI help and version output specs.

use crate::prelude::*;

#[test]
fn help_flag_shows_usage() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("filewatchrest"));
    assert!(stdout.contains("--config"));
}

#[test]
fn version_flag_shows_version() {
    let output = run(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("filewatchrest"));
}
