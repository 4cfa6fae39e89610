// tests/api_tests.rs

use std::sync::Arc;

use posts_backend::{
    config::Config,
    models::user::Role,
    repositories::MemoryStore,
    routes,
    state::AppState,
    utils::{id::UuidGenerator, jwt::JwtTokenManager},
};
use serde_json::{Value, json};

struct TestApp {
    address: String,
    admin_token: String,
    client: reqwest::Client,
}

/// Helper function to spawn the app on a random port for testing.
///
/// Runs on the in-memory store, so no database is needed. An admin account is
/// registered up front and logged in.
async fn spawn_app() -> TestApp {
    let config = Config {
        database_url: None,
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        server_addr: "127.0.0.1:0".parse().unwrap(),
        log_dir: "logs".to_string(),
        admin_email: None,
        admin_password: None,
    };

    let tokens = Arc::new(JwtTokenManager::new(&config.jwt_secret, config.jwt_expiration));
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        tokens,
        Arc::new(UuidGenerator),
        config,
    );

    state
        .users
        .register("Admin", "admin@email.com", "admin-password", Role::Admin)
        .await
        .expect("Failed to seed admin");
    let admin_token = state
        .users
        .login("admin@email.com", "admin-password")
        .await
        .expect("Failed to log in admin")
        .token;

    let app = routes::create_router(state);

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
        admin_token,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Signs up a fresh user and returns its token.
    async fn signup(&self, name: &str, email: &str) -> String {
        let response = self
            .client
            .post(self.url("/users/signup"))
            .json(&json!({ "name": name, "email": email, "password": "password123" }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 201);

        let body: Value = response.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    /// Creates a post and returns its id.
    async fn create_post(&self, token: &str, content: &str) -> String {
        let response = self
            .client
            .post(self.url("/posts"))
            .header("Authorization", token)
            .json(&json!({ "content": content }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 201);

        let body: Value = response.json().await.unwrap();
        body["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn health_check_404() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/random_path_that_does_not_exist"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn signup_fails_validation() {
    let app = spawn_app().await;

    // Name too short, malformed email
    let response = app
        .client
        .post(app.url("/users/signup"))
        .json(&json!({ "name": "y", "email": "not-an-email", "password": "password123" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Validation failed.");
}

#[tokio::test]
async fn signup_then_login() {
    let app = spawn_app().await;
    app.signup("Beltrano", "beltrano@email.com").await;

    let duplicate = app
        .client
        .post(app.url("/users/signup"))
        .json(&json!({ "name": "Beltrano", "email": "beltrano@email.com", "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status().as_u16(), 400);

    let response = app
        .client
        .post(app.url("/users/login"))
        .json(&json!({ "email": "beltrano@email.com", "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Logged in.");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));

    let wrong = app
        .client
        .post(app.url("/users/login"))
        .json(&json!({ "email": "beltrano@email.com", "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status().as_u16(), 400);

    let unknown = app
        .client
        .post(app.url("/users/login"))
        .json(&json!({ "email": "ciclano@email.com", "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status().as_u16(), 404);
}

#[tokio::test]
async fn missing_or_invalid_authorization_is_rejected() {
    let app = spawn_app().await;

    let missing = app.client.get(app.url("/posts")).send().await.unwrap();
    assert_eq!(missing.status().as_u16(), 400);
    let body: Value = missing.json().await.unwrap();
    assert_eq!(body["error"], "Authorization required.");

    let invalid = app
        .client
        .get(app.url("/posts"))
        .header("Authorization", "Bearer not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(invalid.status().as_u16(), 400);
    let body: Value = invalid.json().await.unwrap();
    assert_eq!(body["error"], "Invalid token.");
}

#[tokio::test]
async fn post_lifecycle() {
    let app = spawn_app().await;
    let author = app.signup("Fulano", "fulano@email.com").await;
    let reader = app.signup("Ciclano", "ciclano@email.com").await;

    let post_id = app.create_post(&author, "Hello <b>world</b>").await;

    // Bearer prefix and a bare token are both accepted
    let listed = app
        .client
        .get(app.url("/posts"))
        .header("Authorization", format!("Bearer {}", reader))
        .send()
        .await
        .unwrap();
    assert_eq!(listed.status().as_u16(), 200);
    let posts: Value = listed.json().await.unwrap();
    assert_eq!(posts.as_array().unwrap().len(), 1);
    assert_eq!(posts[0]["creator"]["name"], "Fulano");
    assert_eq!(posts[0]["likes"], 0);

    // Reader reacts: like, then switch to dislike
    let like_url = app.url(&format!("/posts/{}/like", post_id));
    let liked = app
        .client
        .post(&like_url)
        .header("Authorization", &reader)
        .json(&json!({ "like": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(liked.status().as_u16(), 200);
    assert_eq!(liked.json::<String>().await.unwrap(), "You liked this post.");

    let switched = app
        .client
        .post(&like_url)
        .header("Authorization", &reader)
        .json(&json!({ "like": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(
        switched.json::<String>().await.unwrap(),
        "You changed your like to a dislike."
    );

    let reactions: Value = app
        .client
        .get(&like_url)
        .header("Authorization", &reader)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reactions.as_array().unwrap().len(), 1);
    assert_eq!(reactions[0]["like"], false);

    // Author cannot react to their own post
    let own = app
        .client
        .post(&like_url)
        .header("Authorization", &author)
        .json(&json!({ "like": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(own.status().as_u16(), 400);

    // Malformed reaction body
    let malformed = app
        .client
        .post(&like_url)
        .header("Authorization", &reader)
        .json(&json!({ "like": "yes" }))
        .send()
        .await
        .unwrap();
    assert_eq!(malformed.status().as_u16(), 400);

    // Comment, then read it back through the detail view
    let comments_url = app.url(&format!("/posts/{}/comments", post_id));
    let commented = app
        .client
        .post(&comments_url)
        .header("Authorization", &reader)
        .json(&json!({ "comment": "Nice post." }))
        .send()
        .await
        .unwrap();
    assert_eq!(commented.status().as_u16(), 200);
    let body: Value = commented.json().await.unwrap();
    assert_eq!(body["message"], "Commented in this post.");

    let detail: Value = app
        .client
        .get(&comments_url)
        .header("Authorization", &author)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["likes"], -1);
    assert_eq!(detail["comments"].as_array().unwrap().len(), 1);
    assert_eq!(detail["comments"][0]["content"], "Nice post.");
    assert_eq!(detail["comments"][0]["author"]["name"], "Ciclano");

    // Author likes the comment
    let comment_id = detail["comments"][0]["id"].as_str().unwrap().to_string();
    let comment_url = app.url(&format!("/posts/{}/comments/{}", post_id, comment_id));
    let comment_liked = app
        .client
        .post(&comment_url)
        .header("Authorization", &author)
        .json(&json!({ "like": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(
        comment_liked.json::<String>().await.unwrap(),
        "You liked the comment."
    );

    // Only the creator may edit or delete
    let post_url = app.url(&format!("/posts/{}", post_id));
    let foreign_delete = app
        .client
        .delete(&post_url)
        .header("Authorization", &reader)
        .send()
        .await
        .unwrap();
    assert_eq!(foreign_delete.status().as_u16(), 400);

    let edited = app
        .client
        .put(&post_url)
        .header("Authorization", &author)
        .json(&json!({ "content": "Edited content" }))
        .send()
        .await
        .unwrap();
    assert_eq!(edited.status().as_u16(), 200);

    let deleted = app
        .client
        .delete(&post_url)
        .header("Authorization", &author)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 200);
    let body: Value = deleted.json().await.unwrap();
    assert_eq!(body["message"], "Post deleted.");

    let gone = app
        .client
        .get(app.url("/posts"))
        .query(&[("id", post_id.as_str())])
        .header("Authorization", &author)
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status().as_u16(), 404);
}

#[tokio::test]
async fn listing_users_is_admin_only() {
    let app = spawn_app().await;
    let normal = app.signup("Fulano", "fulano@email.com").await;

    let denied = app
        .client
        .get(app.url("/users"))
        .header("Authorization", &normal)
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status().as_u16(), 400);

    let allowed = app
        .client
        .get(app.url("/users"))
        .header("Authorization", &app.admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(allowed.status().as_u16(), 200);
    let users: Value = allowed.json().await.unwrap();
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["role"], "ADMIN");
    assert!(users.iter().all(|u| u.get("password").is_none()));
}
