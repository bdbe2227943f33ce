// tests/api_tests.rs

use std::sync::Arc;

use axum::{body::Body, http::Request};
use sanitize_bench::{
    build_session, clipboard::DisabledClipboard, config::Config,
    models::previewer::PreviewerConfig, routes, state::AppState,
};
use tower::ServiceExt;

fn test_state() -> AppState {
    let config = Config {
        rust_log: "error".to_string(),
        clipboard_enabled: false,
        ..Config::default()
    };
    let session =
        build_session(&config, PreviewerConfig::defaults()).expect("Default previewers must resolve");
    AppState::new(session, config, Arc::new(DisabledClipboard))
}

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    let app = routes::create_router(test_state());

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(&format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn index_renders_every_previewer_in_order() {
    let app = routes::create_router(test_state());

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();

    let positions: Vec<usize> = PreviewerConfig::defaults()
        .iter()
        .map(|c| page.find(&format!("id=\"viewer-{}\"", c.name)).expect("surface rendered"))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(page.contains("data-leader"));
}

#[tokio::test]
async fn index_embeds_script_and_split_view_styles() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&format!("{}/", address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);

    let page = response.text().await.unwrap();
    let script = &page[page.find("<script>").expect("script tag")..];
    assert!(script.contains(r#"addEventListener("submit""#));
    assert!(script.contains(r#"document.querySelectorAll("iframe[data-leader]")"#));
    assert!(script.trim_end().ends_with("</script></body></html>"));

    assert!(page.contains(".split td.moved {"));
    assert!(page.contains(".split td.delete {"));
    assert!(page.contains(".split td.insert {"));
}

#[tokio::test]
async fn lists_builtin_plugins() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let body: serde_json::Value = client
        .get(&format!("{}/api/plugins", address))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    let sanitizers: Vec<&str> = body["sanitizers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        sanitizers,
        vec!["original", "word-paste", "ammonia", "ammonia-whitelist", "text-only"]
    );
    assert_eq!(body["frames"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn put_source_refreshes_previewers() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .put(&format!("{}/api/source", address))
        .json(&serde_json::json!({ "html": "<p onclick=\"x()\">hi</p><script>bad()</script>" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["refreshed"], 5);
    assert_eq!(body["failures"].as_array().unwrap().len(), 0);
    assert_eq!(body["previewers"][0]["leader"], true);

    let og: serde_json::Value = client
        .get(&format!("{}/api/previewers/ogclean/content", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(og["content"].as_str().unwrap().contains("<script>"));

    let cleaned: serde_json::Value = client
        .get(&format!("{}/api/previewers/ammoniaRedbase/content", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cleaned["body_html"], "<p>hi</p>");
}

#[tokio::test]
async fn init_with_unknown_plugin_is_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/workbench/init", address))
        .json(&serde_json::json!({
            "previewers": [
                { "name": "bad", "sanitizers": ["original", "dompurify"], "frame": "clean" }
            ]
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 422);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("dompurify"));

    // Existing previewers survive.
    let previewers: serde_json::Value = client
        .get(&format!("{}/api/previewers", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(previewers.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn init_fails_validation() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act: a previewer without any sanitizer
    let response = client
        .post(&format!("{}/api/workbench/init", address))
        .json(&serde_json::json!({
            "previewers": [{ "name": "empty", "sanitizers": [], "frame": "clean" }]
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn reinit_without_body_keeps_configuration() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/workbench/init", address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["previewers"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn leader_scroll_is_synced() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let body: serde_json::Value = client
        .post(&format!("{}/api/scroll", address))
        .json(&serde_json::json!({ "surfaceId": "viewer-ogclean", "x": 10, "y": 20 }))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert_eq!(body["leader"], true);
    assert_eq!(body["synced"].as_array().unwrap().len(), 4);

    let follower: serde_json::Value = client
        .get(&format!("{}/api/previewers/whitelistRedbase/content", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(follower["scroll"], serde_json::json!({ "x": 10, "y": 20 }));
}

#[tokio::test]
async fn actions_flow() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    client
        .post(&format!("{}/api/source/example/word", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Copy returns immediately even though the clipboard is disabled
    let copied: serde_json::Value = client
        .post(&format!("{}/api/actions", address))
        .json(&serde_json::json!({ "kind": "copyHtml", "previewer": "wordPasteRedbase" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(copied["outcome"], "copied");
    assert!(!copied["payload"]["text"].as_str().unwrap().contains("MsoNormal"));

    let toggled: serde_json::Value = client
        .post(&format!("{}/api/actions", address))
        .json(&serde_json::json!({
            "kind": "toggle", "container": "previewer-ogclean", "flag": "pinLeft"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(toggled["enabled"], true);

    let unknown_flag = client
        .post(&format!("{}/api/actions", address))
        .json(&serde_json::json!({
            "kind": "toggle", "container": "previewer-ogclean", "flag": "sideways"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown_flag.status().as_u16(), 422);

    let created: serde_json::Value = client
        .post(&format!("{}/api/actions", address))
        .json(&serde_json::json!({ "kind": "viewDiff", "previewer": "ammoniaRedbase" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created["outcome"], "diffCreated");
    let diff_id = created["diff"].as_str().unwrap().to_string();

    let diff = client
        .get(&format!("{}/api/diffs/{}", address, diff_id))
        .send()
        .await
        .unwrap();
    assert_eq!(diff.status().as_u16(), 200);

    let missing = client
        .post(&format!("{}/api/actions", address))
        .json(&serde_json::json!({ "kind": "copyHtml", "previewer": "nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn diff_lifecycle() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/diffs", address))
        .json(&serde_json::json!({ "before": "<p>a</p>", "after": "<p>b</p>" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);

    let diff: serde_json::Value = response.json().await.unwrap();
    let id = diff["id"].as_str().unwrap().to_string();
    assert!(diff["error"].is_null());
    assert_eq!(diff["layout"], serde_json::json!(["maximize"]));

    let broken: serde_json::Value = client
        .post(&format!("{}/api/diffs", address))
        .json(&serde_json::json!({ "before": "</div>", "after": "<p>b</p>" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(broken["error"].as_str().is_some());
    assert!(broken["content"].as_str().unwrap().contains("diff-error"));

    let deleted = client
        .delete(&format!("{}/api/diffs/{}", address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);

    let gone = client
        .get(&format!("{}/api/diffs/{}", address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status().as_u16(), 404);
}
