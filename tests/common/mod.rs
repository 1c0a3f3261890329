//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use freelance_client::{ClientConfig, MemoryTokenStore, SessionManager};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(format!("{}/api", server.uri()))
}

pub fn manager(server: &MockServer, store: &Arc<MemoryTokenStore>) -> SessionManager {
    SessionManager::new(&config(server), store.clone()).unwrap()
}

pub fn alice() -> Value {
    json!({
        "id": 1,
        "username": "alice",
        "email": "alice@example.test",
        "name": "Alice",
        "bio": "Designer",
        "specialization": "Design",
        "hourly_rate": 80.0,
        "profile_image": null,
        "is_public": true
    })
}

pub async fn mount_logout(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "message": "Logged out successfully" })))
        .mount(server)
        .await;
}

pub async fn mount_login(server: &MockServer, token: &str, user: Value) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": token, "user": user })))
        .mount(server)
        .await;
}

pub async fn mount_current_user(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("GET"))
        .and(path("/api/auth/user"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Paths of every request the server saw, in order.
pub async fn request_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect()
}
