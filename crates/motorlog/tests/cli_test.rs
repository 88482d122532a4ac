//! Integration tests for the `motorlog` CLI binary.
//!
//! Argument parsing, help output and completions run without a backend;
//! the rest talk to a wiremock server and keep all state in a tempdir.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `motorlog` binary with env isolation.
///
/// Clears all `MOTORLOG_*` env vars and points config and data directories
/// at `home` so tests never touch the user's real configuration.
fn motorlog_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("motorlog");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("NO_COLOR", "1")
        .env_remove("MOTORLOG_PROFILE")
        .env_remove("MOTORLOG_CONFIG")
        .env_remove("MOTORLOG_BASE_URL")
        .env_remove("MOTORLOG_API_KEY")
        .env_remove("MOTORLOG_DATA_DIR")
        .env_remove("MOTORLOG_LOCALE")
        .env_remove("MOTORLOG_OUTPUT")
        .env_remove("MOTORLOG_INSECURE")
        .env_remove("MOTORLOG_TIMEOUT")
        .env_remove("MOTORLOG_PASSWORD")
        .env_remove("MOTORLOG_SOCIAL_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

/// A command wired to `server` with its own data directory.
fn backend_cmd(home: &Path, server: &MockServer) -> assert_cmd::Command {
    let mut cmd = motorlog_cmd(home);
    cmd.args([
        "--base-url",
        &format!("{}/api/v1", server.uri()),
        "--api-key",
        "app-key",
        "--data-dir",
    ])
    .arg(home.join("state"));
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn vehicles_body() -> Value {
    json!({
        "data": [
            { "id": 1, "brand": "Skoda", "model": "Octavia", "year": 2019 },
            { "id": 2, "brand": "Volvo", "model": "V70" }
        ],
        "success": true
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = motorlog_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = tempfile::tempdir().unwrap();
    motorlog_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("vehicles")
                .and(predicate::str::contains("reminders"))
                .and(predicate::str::contains("offline"))
                .and(predicate::str::contains("dictionary")),
        );
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    motorlog_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("motorlog"));
}

#[test]
fn test_completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    motorlog_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_bash() {
    let home = tempfile::tempdir().unwrap();
    motorlog_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let home = tempfile::tempdir().unwrap();
    let output = motorlog_cmd(home.path()).arg("garage").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("garage"),
        "Expected error mentioning the bad subcommand:\n{text}"
    );
}

#[test]
fn test_missing_api_key_is_an_auth_error() {
    let home = tempfile::tempdir().unwrap();
    let output = motorlog_cmd(home.path())
        .args(["--base-url", "http://127.0.0.1:9/api/v1", "vehicles", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("No application key"), "{text}");
}

#[test]
fn test_unknown_profile_is_reported() {
    let home = tempfile::tempdir().unwrap();
    motorlog_cmd(home.path())
        .args(["--profile", "work", "--api-key", "k", "vehicles", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("work"));
}

#[test]
fn test_invalid_output_format() {
    let home = tempfile::tempdir().unwrap();
    let output = motorlog_cmd(home.path())
        .args(["--output", "xml", "vehicles", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("possible values"), "{text}");
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    let home = tempfile::tempdir().unwrap();
    motorlog_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));
}

#[test]
fn test_config_set_then_show_masks_key() {
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("motorlog.toml");
    let file = file.to_str().unwrap();

    motorlog_cmd(home.path())
        .args(["--config", file, "config", "set", "api_key", "plain-secret"])
        .assert()
        .success();
    motorlog_cmd(home.path())
        .args(["--config", file, "config", "set", "locale", "de"])
        .assert()
        .success();

    motorlog_cmd(home.path())
        .args(["--config", file, "config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[profiles.default]")
                .and(predicate::str::contains("locale = \"de\""))
                .and(predicate::str::contains("plain-secret").not()),
        );
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("motorlog.toml");
    motorlog_cmd(home.path())
        .arg("--config")
        .arg(&file)
        .args(["config", "set", "colour", "red"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown config key"));
}

// ── Against a backend ───────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_vehicles_list_as_json() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/vehicles"))
        .and(header("X-API-Key", "app-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vehicles_body()))
        .expect(1)
        .mount(&server)
        .await;

    let output = backend_cmd(home.path(), &server)
        .args(["-o", "json", "vehicles", "list"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let listed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed[0]["model"], "Octavia");
    assert_eq!(listed[1]["brand"], "Volvo");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_list_serves_saved_copy_with_banner() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/vehicles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vehicles_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/vehicles"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .mount(&server)
        .await;

    backend_cmd(home.path(), &server)
        .args(["-o", "plain", "vehicles", "list"])
        .assert()
        .success()
        .stdout("1\n2\n");

    backend_cmd(home.path(), &server)
        .args(["-o", "plain", "vehicles", "list"])
        .assert()
        .success()
        .stdout("1\n2\n")
        .stderr(
            predicate::str::contains("Showing the copy saved")
                .and(predicate::str::contains("Data unavailable, try again later")),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_backend_failure_without_copy_fails() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/reminders"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Nothing here" })),
        )
        .mount(&server)
        .await;

    backend_cmd(home.path(), &server)
        .args(["reminders", "list"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Nothing here"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_form_lists_field_errors() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/vehicles"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "The given data was invalid.",
            "errors": { "model": ["is too short"] }
        })))
        .mount(&server)
        .await;

    backend_cmd(home.path(), &server)
        .args(["vehicles", "add", "--brand", "Skoda", "--model", "O"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("model: is too short"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_persists_session() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "token": "tok-123",
                "user": { "id": 5, "name": "Dana", "email": "dana@example.com" }
            },
            "success": true
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/vehicles"))
        .and(header("Authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vehicles_body()))
        .expect(1)
        .mount(&server)
        .await;

    backend_cmd(home.path(), &server)
        .args(["auth", "login", "--email", "dana@example.com"])
        .env("MOTORLOG_PASSWORD", "hunter22")
        .assert()
        .success()
        .stderr(predicate::str::contains("Signed in as Dana"));

    // A fresh process picks the token up from the data directory.
    backend_cmd(home.path(), &server)
        .args(["-o", "plain", "vehicles", "list"])
        .assert()
        .success()
        .stdout("1\n2\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_guest_mode_answers_locally() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/vehicles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vehicles_body()))
        .expect(0)
        .mount(&server)
        .await;

    backend_cmd(home.path(), &server)
        .args(["auth", "guest"])
        .assert()
        .success();

    backend_cmd(home.path(), &server)
        .args(["-o", "json-compact", "vehicles", "list"])
        .assert()
        .success()
        .stdout("[]\n")
        .stderr(predicate::str::contains("Guest mode"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_offline_changes_are_queued() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/vehicles"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "data": {} })))
        .expect(0)
        .mount(&server)
        .await;

    backend_cmd(home.path(), &server)
        .args(["--offline", "vehicles", "add", "--brand", "Fiat", "--model", "Panda"])
        .assert()
        .success()
        .stderr(predicate::str::contains("saved locally"));

    let output = backend_cmd(home.path(), &server)
        .args(["-o", "json", "offline", "pending"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let pending: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(pending.as_array().unwrap().len(), 1);
    assert_eq!(pending[0]["type"], "create");
    assert_eq!(pending[0]["entity"], "vehicle");
    assert_eq!(pending[0]["data"]["model"], "Panda");

    let id = pending[0]["id"].as_str().unwrap().to_string();
    backend_cmd(home.path(), &server)
        .args(["offline", "drop", &id])
        .assert()
        .success();
    backend_cmd(home.path(), &server)
        .args(["-o", "plain", "offline", "status"])
        .assert()
        .success()
        .stdout("0\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dictionary_is_cached_between_runs() {
    let server = MockServer::start().await;
    let home = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/expense-types"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": 1, "name": "Fuel", "slug": "fuel" }]
        })))
        .mount(&server)
        .await;

    backend_cmd(home.path(), &server)
        .args(["-o", "plain", "dictionary", "expense-types"])
        .assert()
        .success()
        .stdout("1\n");

    // Second run is answered from the cache; the backend goes away.
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/expense-types"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({})))
        .mount(&server)
        .await;

    backend_cmd(home.path(), &server)
        .args(["-o", "plain", "dictionary", "expense-types"])
        .assert()
        .success()
        .stdout("1\n");
}
