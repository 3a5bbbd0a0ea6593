//! Shared fixtures for integration tests
#![allow(dead_code)]

use axum_test::TestServer;
use fitcoach::{ApiClient, AppState, FitcoachConfig, Session};
use serde_json::{Value, json};
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";
pub const BEARER: &str = "Bearer test-token";
pub const CREATED_AT: &str = "2024-03-05T10:15:00";

/// Client signed in with [`TOKEN`] against the mock backend.
pub fn signed_in(backend: &MockServer) -> ApiClient {
    ApiClient::with_token(backend.uri(), TOKEN)
}

pub fn anonymous(backend: &MockServer) -> ApiClient {
    ApiClient::new(backend.uri(), Session::anonymous())
}

/// Proxy server relaying to `backend_url`.
pub fn proxy(backend_url: &str) -> TestServer {
    let mut config = FitcoachConfig::default();
    config.backend.url = backend_url.to_string();
    let app = fitcoach::api::routes::app(AppState::new(config));
    TestServer::new(app).expect("Failed to create test server")
}

pub fn plan_json(id: i64, plan_type: &str) -> Value {
    json!({
        "id": id,
        "user_id": 1,
        "type": plan_type,
        "content": format!("# Plan {}\n- Squat 3x10", id),
        "created_at": CREATED_AT,
        "title": null
    })
}

pub fn message_json(id: &str, role: &str, content: &str) -> Value {
    json!({
        "id": id,
        "role": role,
        "content": content,
        "timestamp": CREATED_AT,
        "is_plan": false,
        "plan_type": null,
        "user_id": 1
    })
}

pub fn entry_json(id: i64, weight: f64) -> Value {
    json!({
        "id": id,
        "user_id": 1,
        "date": CREATED_AT,
        "weight": weight,
        "body_fat": null,
        "measurements": {"waist": 82.0},
        "workout_performance": null,
        "energy_level": 7,
        "mood": 6,
        "sleep_quality": 8,
        "notes": "test",
        "created_at": CREATED_AT,
        "updated_at": null
    })
}

pub fn detail(message: &str) -> Value {
    json!({ "detail": message })
}
