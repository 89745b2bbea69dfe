//! Configuration hot-reload specs: editing the config file on disk retargets
//! the watcher set without restarting the process.

use crate::prelude::*;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn editing_the_config_file_retargets_the_watched_folder() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let daemon = Daemon::start(&format!("{}/notify", server.uri())).await;

    let original_watched = daemon.watched.clone();
    let new_watched = original_watched.parent().expect("parent").join("watched-2");
    std::fs::create_dir_all(&new_watched).expect("mkdir");

    daemon.rewrite_config(|config| {
        config["folders"] = serde_json::json!([new_watched.to_string_lossy()]);
    });

    let retargeted = wait_for(|| async {
        let status = daemon.status().await;
        let watchers = status["active_watchers"].as_array().cloned().unwrap_or_default();
        let has_new = watchers
            .iter()
            .any(|w| w.as_str().map(|s| s.contains("watched-2")).unwrap_or(false));
        let has_old = watchers.iter().any(|w| {
            w.as_str()
                .map(|s| s == original_watched.to_string_lossy())
                .unwrap_or(false)
        });
        has_new && !has_old
    })
    .await;

    assert!(retargeted, "expected the watcher set to track the reloaded folder list");
}
