// tests/api_tests.rs

use std::sync::Arc;

use blog_backend::{
    config::Config, repository::MemoryPostRepository, routes, state::AppState,
};
use serde_json::{Value, json};

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    // 1. In-memory storage, one per test
    let posts = Arc::new(MemoryPostRepository::new());

    // 2. Create test configuration and state
    let config = Config {
        rust_log: "error".to_string(),
        ..Config::default()
    };
    let state = AppState::new(posts, config);

    // 3. Create the router with the app state
    let app = routes::create_router(state);

    // 4. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 5. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn create(client: &reqwest::Client, address: &str, title: &str, content: &str) -> reqwest::Response {
    client
        .post(format!("{}/api/posts/create", address))
        .json(&json!({ "title": title, "content": content }))
        .send()
        .await
        .expect("Failed to execute request")
}

#[tokio::test]
async fn health_check_works() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn unknown_path_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn create_post_works() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = create(&client, &address, "  Hello, World!  ", "<p>First</p>").await;

    // Assert
    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["post"]["title"], "Hello, World!");
    assert_eq!(body["post"]["slug"], "hello-world");
    assert!(body["post"]["id"].is_i64());
}

#[tokio::test]
async fn create_post_sanitizes_content() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = create(
        &client,
        &address,
        "XSS attempt",
        r#"<script>alert(1)</script><p onclick="x()">hi</p><a href="javascript:evil()">link</a>"#,
    )
    .await;
    assert_eq!(response.status().as_u16(), 201);

    let post: Value = client
        .get(format!("{}/api/posts/xss-attempt", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let content = post["post"]["content"].as_str().unwrap();
    assert!(content.contains("<p>hi</p>"));
    assert!(!content.contains("script"));
    assert!(!content.contains("onclick"));
    assert!(!content.contains("javascript"));
}

#[tokio::test]
async fn duplicate_titles_get_numbered_slugs() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let mut slugs = Vec::new();
    for _ in 0..3 {
        let body: Value = create(&client, &address, "My Post", "<p>x</p>")
            .await
            .json()
            .await
            .unwrap();
        slugs.push(body["post"]["slug"].as_str().unwrap().to_string());
    }

    assert_eq!(slugs, vec!["my-post", "my-post-1", "my-post-2"]);
}

#[tokio::test]
async fn create_post_fails_validation() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    for payload in [
        json!({ "title": "", "content": "<p>x</p>" }),
        json!({ "title": "   ", "content": "<p>x</p>" }),
        json!({ "title": "Title" }),
    ] {
        let response = client
            .post(format!("{}/api/posts/create", address))
            .json(&payload)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Title and content are required");
    }

    // Nothing was stored
    let list: Value = client
        .get(format!("{}/api/posts", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list["posts"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn long_title_accepted() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let title = "word ".repeat(60);
    let response = create(&client, &address, &title, "<p>x</p>").await;

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["post"]["title"], title.trim());
}

#[tokio::test]
async fn typographic_apostrophe_slug() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let body: Value = create(&client, &address, "Don’t Panic", "<p>x</p>")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["post"]["slug"], "dont-panic");
}

#[tokio::test]
async fn punctuation_only_title_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = create(&client, &address, "!!! ...", "<p>x</p>").await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn list_posts_newest_first_with_excerpt() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    create(&client, &address, "Older", "<p>old</p>").await;
    create(&client, &address, "Newer", "<h1>Big</h1>\n<p>news   today</p>").await;

    let list: Value = client
        .get(format!("{}/api/posts", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let posts = list["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["slug"], "newer");
    assert_eq!(posts[0]["excerpt"], "Big news today");
    assert_eq!(posts[1]["slug"], "older");
}

#[tokio::test]
async fn get_missing_post_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/posts/nope", address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Post not found");
}

#[tokio::test]
async fn update_flow() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    create(&client, &address, "My Post", "<p>v1</p>").await;
    create(&client, &address, "Renamed", "<p>other</p>").await;

    // Same title: slug stays, content re-sanitized
    let response = client
        .put(format!("{}/api/posts/my-post", address))
        .json(&json!({ "title": "My Post", "content": "<p>v2</p><img src=x onerror=alert(1)>" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["post"]["slug"], "my-post");
    assert!(body["post"]["content"].as_str().unwrap().starts_with("<p>v2</p>"));
    assert!(!body["post"]["content"].as_str().unwrap().contains("onerror"));

    // New title colliding with another post: numbered
    let body: Value = client
        .put(format!("{}/api/posts/my-post", address))
        .json(&json!({ "title": "Renamed", "content": "<p>v3</p>" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["post"]["slug"], "renamed-1");
    assert_eq!(body["post"]["title"], "Renamed");

    // Old slug is gone
    let response = client
        .get(format!("{}/api/posts/my-post", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn update_keeps_created_at() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    create(&client, &address, "Stable", "<p>v1</p>").await;
    let before: Value = client
        .get(format!("{}/api/posts/stable", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let after: Value = client
        .put(format!("{}/api/posts/stable", address))
        .json(&json!({ "title": "Stable", "content": "<p>v2</p>" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(after["post"]["created_at"], before["post"]["created_at"]);
    assert_eq!(after["post"]["id"], before["post"]["id"]);
}

#[tokio::test]
async fn update_missing_post_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .put(format!("{}/api/posts/ghost", address))
        .json(&json!({ "title": "Ghost", "content": "<p>boo</p>" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn delete_flow() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    create(&client, &address, "Short lived", "<p>bye</p>").await;

    let response = client
        .delete(format!("{}/api/posts/short-lived", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Post deleted successfully");

    let response = client
        .delete(format!("{}/api/posts/short-lived", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    // Slug is free again
    let body: Value = create(&client, &address, "Short lived", "<p>again</p>")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["post"]["slug"], "short-lived");
}
