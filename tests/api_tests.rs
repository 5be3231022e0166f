// tests/api_tests.rs

use std::sync::Arc;

use feed_backend::{
    config::{CloudinaryConfig, Config, default_cors_origins},
    models::user::Identity,
    repository::InMemoryFeedRepository,
    routes,
    services::feed::FeedService,
    state::AppState,
    storage::InMemoryObjectStore,
    utils::jwt::sign_jwt,
};
use reqwest::multipart::{Form, Part};
use serde_json::Value;

const JWT_SECRET: &str = "test_secret_for_integration_tests";

struct TestApp {
    address: String,
    store: Arc<InMemoryObjectStore>,
    client: reqwest::Client,
}

/// Helper function to spawn the app on a random port for testing.
/// Backed by the in-memory repository and object store.
async fn spawn_app() -> TestApp {
    spawn_app_with(5 * 1024 * 1024).await
}

async fn spawn_app_with(max_upload_bytes: usize) -> TestApp {
    let config = Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        cors_origins: default_cors_origins(),
        max_attachments: 10,
        max_upload_bytes,
        cloudinary: CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            folder: "feeds".to_string(),
            api_base: "http://127.0.0.1:9".to_string(),
        },
    };

    let store = Arc::new(InMemoryObjectStore::new());
    let feeds = FeedService::new(
        Arc::new(InMemoryFeedRepository::new()),
        store.clone(),
        config.max_attachments,
    );

    let app = routes::create_router(AppState { feeds, config });

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        store,
        client: reqwest::Client::new(),
    }
}

fn token_for(id: &str, username: &str) -> String {
    let identity = Identity {
        id: id.to_string(),
        username: username.to_string(),
    };
    sign_jwt(&identity, JWT_SECRET, 600).expect("Failed to sign token")
}

fn file_part(name: &str, mime: &str) -> Part {
    Part::bytes(b"fake file contents".to_vec())
        .file_name(name.to_string())
        .mime_str(mime)
        .unwrap()
}

fn post_form(title: &str, description: &str, files: &[(&str, &str)]) -> Form {
    let mut form = Form::new()
        .text("title", title.to_string())
        .text("description", description.to_string());
    for (name, mime) in files {
        form = form.part("files", file_part(name, mime));
    }
    form
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    async fn create_post(&self, token: &str, form: Form) -> reqwest::Response {
        self.client
            .post(self.url("/api/feeds"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn create_post_ok(&self, token: &str, files: &[(&str, &str)]) -> Value {
        let response = self
            .create_post(token, post_form("Lost Book", "Near library", files))
            .await;
        assert_eq!(response.status().as_u16(), 201);
        response.json().await.unwrap()
    }

    async fn post_action(&self, token: &str, post_id: &str, action: &str) -> reqwest::Response {
        self.client
            .post(self.url(&format!("/api/feeds/{}/{}", post_id, action)))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn list(&self) -> Vec<Value> {
        self.client
            .get(self.url("/api/feeds"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn unknown_path_is_404() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/random_path_that_does_not_exist"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn empty_feed_lists_nothing() {
    let app = spawn_app().await;
    assert!(app.list().await.is_empty());
}

#[tokio::test]
async fn create_requires_credentials() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/feeds"))
        .multipart(post_form("t", "d", &[]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    let response = app.create_post("not-a-jwt", post_form("t", "d", &[])).await;
    assert_eq!(response.status().as_u16(), 403);

    assert!(app.store.uploads().is_empty());
}

#[tokio::test]
async fn non_bearer_credentials_are_forbidden() {
    let app = spawn_app().await;

    for header in ["Basic dXNlcjpwYXNz", "bearer abc", "Token abc", "Bearer ", "Bearer    "] {
        let response = app
            .client
            .post(app.url("/api/feeds"))
            .header("Authorization", header)
            .multipart(post_form("t", "d", &[]))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 403, "{header:?}");
    }

    let response = app
        .client
        .post(app.url("/api/feeds/00000000-0000-0000-0000-000000000000/like"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    assert!(app.list().await.is_empty());
}

#[tokio::test]
async fn lost_book_scenario() {
    let app = spawn_app().await;
    let token_a = token_for("user-a", "alice");
    let token_b = token_for("user-b", "bob");

    // A creates a post with one image
    let post = app.create_post_ok(&token_a, &[("img.jpg", "image/jpeg")]).await;
    let post_id = post["id"].as_str().unwrap().to_string();
    assert_eq!(post["attachments"][0]["kind"], "image");
    assert_eq!(post["posted_by"]["username"], "alice");
    let storage_key = post["attachments"][0]["storage_key"]
        .as_str()
        .unwrap()
        .to_string();

    // B likes, then likes again
    let response = app.post_action(&token_b, &post_id, "like").await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["likes"], 1);

    let response = app.post_action(&token_b, &post_id, "like").await;
    assert_eq!(response.status().as_u16(), 403);

    // A deletes
    let response = app
        .client
        .delete(app.url(&format!("/api/feeds/{}", post_id)))
        .bearer_auth(&token_a)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let report: Value = response.json().await.unwrap();
    assert_eq!(report["cleanup"][0]["status"], "removed");

    let deletes = app.store.deletes();
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].0, storage_key);

    assert!(app.list().await.is_empty());
}

#[tokio::test]
async fn attachments_keep_order_and_pdf_uses_raw_path() {
    let app = spawn_app().await;
    let token = token_for("user-a", "alice");

    let post = app
        .create_post_ok(
            &token,
            &[
                ("notes.pdf", "application/pdf"),
                ("clip.mp4", "video/mp4"),
                ("cat.png", "image/png"),
            ],
        )
        .await;

    let attachments = post["attachments"].as_array().unwrap();
    assert_eq!(attachments.len(), 3);
    assert_eq!(attachments[0]["kind"], "document");
    assert_eq!(attachments[1]["kind"], "video");
    assert_eq!(attachments[2]["kind"], "image");

    let pdf_url = attachments[0]["url"].as_str().unwrap();
    assert!(pdf_url.contains("/raw/upload/"));
    assert!(!pdf_url.contains("/image/upload/"));
    assert!(pdf_url.ends_with("notes.pdf"));
}

#[tokio::test]
async fn create_validates_fields_and_file_count() {
    let app = spawn_app().await;
    let token = token_for("user-a", "alice");

    let response = app.create_post(&token, post_form("Lost Book", "", &[])).await;
    assert_eq!(response.status().as_u16(), 400);

    let too_many: Vec<(String, &str)> = (0..11)
        .map(|i| (format!("{}.jpg", i), "image/jpeg"))
        .collect();
    let too_many: Vec<(&str, &str)> = too_many.iter().map(|(n, m)| (n.as_str(), *m)).collect();
    let response = app
        .create_post(&token, post_form("Lost Book", "Near library", &too_many))
        .await;
    assert_eq!(response.status().as_u16(), 400);

    assert!(app.list().await.is_empty());
}

fn numbered_files(count: usize) -> Vec<(String, &'static str)> {
    (0..count)
        .map(|i| (format!("{:02}.jpg", i), "image/jpeg"))
        .collect()
}

#[tokio::test]
async fn ten_files_are_accepted_in_order() {
    let app = spawn_app().await;
    let names = numbered_files(10);
    let files: Vec<(&str, &str)> = names.iter().map(|(n, m)| (n.as_str(), *m)).collect();

    let post = app
        .create_post_ok(&token_for("user-a", "alice"), &files)
        .await;

    let attachments = post["attachments"].as_array().unwrap();
    assert_eq!(attachments.len(), 10);
    for (attachment, (name, _)) in attachments.iter().zip(&names) {
        assert!(attachment["url"].as_str().unwrap().ends_with(name.as_str()));
    }

    let uploaded: Vec<String> = app.store.uploads().into_iter().map(|(_, name)| name).collect();
    let expected: Vec<String> = names.into_iter().map(|(name, _)| name).collect();
    assert_eq!(uploaded, expected);
}

#[tokio::test]
async fn empty_file_parts_do_not_count_toward_the_limit() {
    let app = spawn_app().await;
    let names = numbered_files(10);
    let files: Vec<(&str, &str)> = names.iter().map(|(n, m)| (n.as_str(), *m)).collect();

    let empty = Part::bytes(Vec::new())
        .file_name("")
        .mime_str("application/octet-stream")
        .unwrap();
    let form = post_form("Lost Book", "Near library", &files).part("files", empty);

    let response = app.create_post(&token_for("user-a", "alice"), form).await;
    assert_eq!(response.status().as_u16(), 201);

    let post: Value = response.json().await.unwrap();
    assert_eq!(post["attachments"].as_array().unwrap().len(), 10);
    assert_eq!(app.store.uploads().len(), 10);
}

#[tokio::test]
async fn oversized_upload_is_413() {
    let app = spawn_app_with(1024).await;

    let big = Part::bytes(vec![7u8; 4096])
        .file_name("scan.png")
        .mime_str("image/png")
        .unwrap();
    let form = post_form("Lost Book", "Near library", &[]).part("files", big);

    let response = app.create_post(&token_for("user-a", "alice"), form).await;
    assert_eq!(response.status().as_u16(), 413);

    assert!(app.store.uploads().is_empty());
    assert!(app.list().await.is_empty());
}

#[tokio::test]
async fn non_owner_cannot_delete() {
    let app = spawn_app().await;
    let post = app
        .create_post_ok(&token_for("user-a", "alice"), &[("img.jpg", "image/jpeg")])
        .await;
    let post_id = post["id"].as_str().unwrap();

    let response = app
        .client
        .delete(app.url(&format!("/api/feeds/{}", post_id)))
        .bearer_auth(token_for("user-b", "bob"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 403);
    assert!(app.store.deletes().is_empty());
    assert_eq!(app.list().await.len(), 1);
}

#[tokio::test]
async fn missing_post_is_404() {
    let app = spawn_app().await;
    let token = token_for("user-a", "alice");

    let response = app
        .post_action(&token, "00000000-0000-0000-0000-000000000000", "like")
        .await;
    assert_eq!(response.status().as_u16(), 404);

    let response = app
        .client
        .delete(app.url("/api/feeds/not-a-uuid"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let response = app
        .client
        .get(app.url("/api/feeds/00000000-0000-0000-0000-000000000000"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn unlike_without_like_keeps_count() {
    let app = spawn_app().await;
    let post = app.create_post_ok(&token_for("user-a", "alice"), &[]).await;
    let post_id = post["id"].as_str().unwrap();

    app.post_action(&token_for("user-b", "bob"), post_id, "like").await;

    let response = app
        .post_action(&token_for("user-c", "carol"), post_id, "unlike")
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["likes"], 1);
}

#[tokio::test]
async fn concurrent_likes_from_different_users_both_count() {
    let app = spawn_app().await;
    let post = app.create_post_ok(&token_for("user-a", "alice"), &[]).await;
    let post_id = post["id"].as_str().unwrap();
    let (token_b, token_c) = (token_for("user-b", "bob"), token_for("user-c", "carol"));

    let (first, second) = tokio::join!(
        app.post_action(&token_b, post_id, "like"),
        app.post_action(&token_c, post_id, "like"),
    );
    assert_eq!(first.status().as_u16(), 200);
    assert_eq!(second.status().as_u16(), 200);

    let post: Value = app
        .client
        .get(app.url(&format!("/api/feeds/{}", post_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(post["likes_count"], 2);
}

#[tokio::test]
async fn comments_append_in_order() {
    let app = spawn_app().await;
    let post = app.create_post_ok(&token_for("user-a", "alice"), &[]).await;
    let post_id = post["id"].as_str().unwrap();
    let comment_url = app.url(&format!("/api/feeds/{}/comment", post_id));

    let response = app
        .client
        .post(&comment_url)
        .bearer_auth(token_for("user-b", "bob"))
        .json(&serde_json::json!({ "text": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    app.client
        .post(&comment_url)
        .bearer_auth(token_for("user-b", "bob"))
        .json(&serde_json::json!({ "text": "Saw it at the desk" }))
        .send()
        .await
        .unwrap();

    let response = app
        .client
        .post(&comment_url)
        .bearer_auth(token_for("user-c", "carol"))
        .json(&serde_json::json!({ "text": "Still there?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let comments: Vec<Value> = response.json().await.unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[1]["text"], "Still there?");
    assert_eq!(comments[1]["commented_by"]["username"], "carol");
}

#[tokio::test]
async fn profile_lists_only_own_posts() {
    let app = spawn_app().await;
    let token_a = token_for("user-a", "alice");

    app.create_post_ok(&token_a, &[]).await;
    app.create_post_ok(&token_for("user-b", "bob"), &[]).await;

    let profile: Value = app
        .client
        .get(app.url("/api/profile"))
        .bearer_auth(&token_a)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(profile["user"]["username"], "alice");
    let feeds = profile["feeds"].as_array().unwrap();
    assert_eq!(feeds.len(), 1);
    assert_eq!(feeds[0]["posted_by"]["id"], "user-a");
}
