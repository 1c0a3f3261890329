//! Integration tests for the `freelance` binary.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn freelance(dir: &Path, base_url: &str) -> Command {
    let mut cmd = Command::cargo_bin("freelance").unwrap();
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("FREELANCE_PASSWORD")
        .env_remove("FREELANCE_HOME")
        .env("FREELANCE_BASE_URL", base_url)
        .env("FREELANCE_TOKEN_FILE", dir.join("token.json"));
    cmd
}

fn read_token(dir: &Path) -> Option<String> {
    let raw = fs::read_to_string(dir.join("token.json")).ok()?;
    let value: serde_json::Value = serde_json::from_str(&raw).ok()?;
    value["token"].as_str().map(str::to_owned)
}

#[test]
fn help_lists_session_commands() {
    Command::cargo_bin("freelance")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("register"))
        .stdout(predicate::str::contains("whoami"))
        .stdout(predicate::str::contains("portfolio"));
}

#[test]
fn whoami_without_token_reports_logged_out() {
    let temp = tempdir().unwrap();
    freelance(temp.path(), "http://127.0.0.1:1/api")
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("not logged in"));
}

#[test]
fn invalid_base_url_is_rejected() {
    let temp = tempdir().unwrap();
    freelance(temp.path(), "localhost:5001")
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid base URL"));
}

#[tokio::test(flavor = "multi_thread")]
async fn login_writes_token_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "username": "alice", "password": "pw" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": "t2", "user": { "id": 1, "username": "alice" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let temp = tempdir().unwrap();
    freelance(temp.path(), &format!("{}/api", server.uri()))
        .args(["login", "alice"])
        .env("FREELANCE_PASSWORD", "pw")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"username\": \"alice\""));

    assert_eq!(read_token(temp.path()).as_deref(), Some("t2"));
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_login_exits_non_zero_with_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid username or password" })))
        .mount(&server)
        .await;

    let temp = tempdir().unwrap();
    freelance(temp.path(), &format!("{}/api", server.uri()))
        .args(["login", "alice", "--password", "wrong"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid username or password"));

    assert_eq!(read_token(temp.path()), None);
}

#[tokio::test(flavor = "multi_thread")]
async fn whoami_restores_persisted_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "username": "alice" })))
        .expect(1)
        .mount(&server)
        .await;

    let temp = tempdir().unwrap();
    fs::write(temp.path().join("token.json"), r#"{"token":"abc"}"#).unwrap();

    freelance(temp.path(), &format!("{}/api", server.uri()))
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"username\": \"alice\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn logout_removes_token_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "username": "alice" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Logged out successfully" })))
        .expect(1)
        .mount(&server)
        .await;

    let temp = tempdir().unwrap();
    fs::write(temp.path().join("token.json"), r#"{"token":"abc"}"#).unwrap();

    freelance(temp.path(), &format!("{}/api", server.uri()))
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("logged out"));

    assert!(!temp.path().join("token.json").exists());
}

#[test]
fn profile_without_fields_is_rejected() {
    let temp = tempdir().unwrap();
    freelance(temp.path(), "http://127.0.0.1:1/api")
        .arg("profile")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to update"));
}
