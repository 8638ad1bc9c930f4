//! CLI tests against a mock dashboard API.
//!
//! Each test gets its own temporary HOME so stored credentials never leak
//! between tests or into the user's real data directory.

mod common;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{run, run_cli_with_env, run_success};

async fn mount_active_sign_in(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/signin"))
        .and(body_json(json!({
            "email": "owner@example.com",
            "password": "hunter22"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "old-access",
            "refreshToken": "refresh-1",
            "status": "ACTIVE"
        })))
        .mount(server)
        .await;
}

async fn mount_account(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path("/api/account/"))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Ada",
            "email": "owner@example.com"
        })))
        .mount(server)
        .await;
}

const LOGIN: &[&str] = &[
    "auth",
    "login",
    "--email",
    "owner@example.com",
    "--password",
    "hunter22",
];

#[test]
fn missing_api_url_is_reported() {
    let home = TempDir::new().unwrap();
    let mut cmd = std::process::Command::new(env!("CARGO_BIN_EXE_bistro"));
    cmd.args(["auth", "whoami"])
        .env("HOME", home.path())
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env_remove("BISTRO_API_URL");
    let output = cmd.output().unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("BISTRO_API_URL"));
}

#[test]
fn insecure_remote_api_url_is_rejected() {
    let home = TempDir::new().unwrap();
    let output = run_cli_with_env(&["auth", "whoami"], home.path(), "http://pos.example.com");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid API URL"));
}

#[tokio::test(flavor = "multi_thread")]
async fn login_persists_session_for_later_commands() {
    let server = MockServer::start().await;
    mount_active_sign_in(&server).await;
    mount_account(&server, "old-access").await;

    let home = TempDir::new().unwrap();
    let stdout = run_success(LOGIN, home.path(), &server.uri()).await;
    assert!(stdout.contains("Signed in successfully"));

    let stdout = run_success(&["auth", "whoami"], home.path(), &server.uri()).await;
    assert!(stdout.contains("Ada"));
    assert!(stdout.contains("owner@example.com"));
}

#[tokio::test(flavor = "multi_thread")]
async fn expired_token_is_refreshed_and_persisted() {
    let server = MockServer::start().await;
    mount_active_sign_in(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .and(header("authorization", "Bearer old-access"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .and(header("authorization", "Bearer new-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "o1" }])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({ "refreshToken": "refresh-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "new-access"
        })))
        .expect(1)
        .mount(&server)
        .await;

    mount_account(&server, "new-access").await;

    let home = TempDir::new().unwrap();
    run_success(LOGIN, home.path(), &server.uri()).await;

    let stdout = run_success(
        &["api", "--compact", "get", "/api/orders"],
        home.path(),
        &server.uri(),
    )
    .await;
    assert_eq!(stdout.trim(), r#"[{"id":"o1"}]"#);

    // A new process picks up the refreshed token from disk.
    let stdout = run_success(&["auth", "whoami"], home.path(), &server.uri()).await;
    assert!(stdout.contains("Ada"));
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_refresh_signs_the_user_out() {
    let server = MockServer::start().await;
    mount_active_sign_in(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Refresh token revoked"
        })))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    run_success(LOGIN, home.path(), &server.uri()).await;

    let output = run(&["api", "get", "/api/orders"], home.path(), &server.uri()).await;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Sign in again"), "stderr: {stderr}");

    let output = run(&["auth", "whoami"], home.path(), &server.uri()).await;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No active session"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unattached_account_needs_business_name() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "setup-1",
            "status": "ORG_UNATTACHED"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/create-organization"))
        .and(header("authorization", "Bearer setup-1"))
        .and(body_json(json!({ "name": "Cafe Nova" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "org-1" })))
        .expect(1)
        .mount(&server)
        .await;

    mount_account(&server, "setup-1").await;

    let home = TempDir::new().unwrap();

    let output = run(LOGIN, home.path(), &server.uri()).await;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--business-name"));

    let mut args = LOGIN.to_vec();
    args.extend(["--business-name", "Cafe Nova"]);
    let stdout = run_success(&args, home.path(), &server.uri()).await;
    assert!(stdout.contains("Cafe Nova"));

    run_success(&["auth", "whoami"], home.path(), &server.uri()).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn logout_removes_stored_credentials() {
    let server = MockServer::start().await;
    mount_active_sign_in(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .and(header("authorization", "Bearer old-access"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    run_success(LOGIN, home.path(), &server.uri()).await;

    let stdout = run_success(&["auth", "logout"], home.path(), &server.uri()).await;
    assert!(stdout.contains("Logged out"));

    let output = run(&["auth", "whoami"], home.path(), &server.uri()).await;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No active session"));
}
