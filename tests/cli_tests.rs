//! CLI Integration Tests for fitcoach
//!
//! Drives subcommands through the library entry points with the session
//! kept in a temporary token file.

mod common;

use clap::Parser;
use fitcoach::FitcoachConfig;
use fitcoach::cli::commands::{self, Context};
use fitcoach::cli::output::Output;
use fitcoach::cli::{Cli, Commands};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context(backend: &MockServer, token_file: &Path) -> Context {
    let mut config = FitcoachConfig::default();
    config.backend.url = backend.uri();
    config.session.token_file = Some(token_file.to_path_buf());
    Context::new(config, Output::no_color()).expect("Failed to build context")
}

fn command(args: &[&str]) -> Commands {
    let argv = std::iter::once("fitcoach").chain(args.iter().copied());
    Cli::try_parse_from(argv)
        .expect("Failed to parse arguments")
        .command
        .expect("Missing subcommand")
}

#[tokio::test]
async fn test_login_then_logout_manages_token_file() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access_token": "abc" })),
        )
        .mount(&backend)
        .await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let token_file = temp_dir.path().join("token");

    let ctx = context(&backend, &token_file);
    commands::run(command(&["login", "alice", "--password", "secret"]), &ctx)
        .await
        .unwrap();
    assert_eq!(fs::read_to_string(&token_file).unwrap().trim(), "abc");

    // A fresh context picks the stored token up.
    let ctx = context(&backend, &token_file);
    assert!(ctx.client.session().is_authenticated());

    commands::run(command(&["logout"]), &ctx).await.unwrap();
    let ctx = context(&backend, &token_file);
    assert!(!ctx.client.session().is_authenticated());
}

#[tokio::test]
async fn test_protected_command_without_session_asks_for_login() {
    let backend = MockServer::start().await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let ctx = context(&backend, &temp_dir.path().join("token"));

    let err = commands::run(command(&["plans", "list"]), &ctx)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("fitcoach login"));
}

#[tokio::test]
async fn test_error_banner_fails_the_command() {
    let backend = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/plans/3"))
        .and(header("authorization", "Bearer stored"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(common::detail("Plan not found")),
        )
        .expect(1)
        .mount(&backend)
        .await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let token_file = temp_dir.path().join("token");
    fs::write(&token_file, "stored\n").unwrap();

    let ctx = context(&backend, &token_file);
    let err = commands::run(command(&["plans", "delete", "3", "--yes"]), &ctx)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Plan not found");
}

#[tokio::test]
async fn test_progress_add_posts_parsed_fields() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/progress/"))
        .and(wiremock::matchers::body_partial_json(json!({
            "weight": 80.5,
            "notes": "test"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::entry_json(1, 80.5)))
        .expect(1)
        .mount(&backend)
        .await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let token_file = temp_dir.path().join("token");
    fs::write(&token_file, common::TOKEN).unwrap();

    let ctx = context(&backend, &token_file);
    commands::run(
        command(&["progress", "add", "weight=80.5", "notes=test"]),
        &ctx,
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_out_of_range_value_is_rejected_locally() {
    let backend = MockServer::start().await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let token_file = temp_dir.path().join("token");
    fs::write(&token_file, common::TOKEN).unwrap();

    let ctx = context(&backend, &token_file);
    let err = commands::run(command(&["progress", "add", "weight=900"]), &ctx)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Weight must be between 30 and 300"));
}

#[test]
fn test_config_command_renders_defaults() {
    let config = FitcoachConfig::default();
    commands::show_config(
        &config,
        Path::new("/nonexistent/fitcoach.toml"),
        true,
        true,
        &Output::no_color(),
    )
    .unwrap();
}
