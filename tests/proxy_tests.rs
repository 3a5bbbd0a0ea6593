//! Proxy route tests: axum-test in front, wiremock behind

mod common;

use axum::http::StatusCode;
use common::{BEARER, detail, message_json};
use serde_json::{Value, json};
use wiremock::matchers::{any, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UNREACHABLE: &str = "http://127.0.0.1:9";

#[tokio::test]
async fn test_health_check() {
    let server = common::proxy(UNREACHABLE);

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn test_missing_authorization_is_rejected_before_relaying() {
    let backend = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&backend)
        .await;
    let server = common::proxy(&backend.uri());

    for response in [
        server.get("/api/chat/history").await,
        server.post("/api/chat/send").json(&json!({ "content": "hi" })).await,
        server.get("/api/v1/progress/analysis").await,
        server.post("/api/v1/progress/adaptive-plan").await,
    ] {
        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&detail("Authorization header is required"));
    }
}

#[tokio::test]
async fn test_blank_authorization_is_rejected() {
    let server = common::proxy(UNREACHABLE);

    let response = server
        .get("/api/chat/history")
        .add_header("Authorization", "   ")
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_history_is_relayed_with_authorization() {
    let backend = MockServer::start().await;
    let history = json!({ "messages": [message_json("m1", "user", "Leg day?")] });
    Mock::given(method("GET"))
        .and(path("/api/v1/chat/history"))
        .and(header("authorization", BEARER))
        .respond_with(ResponseTemplate::new(200).set_body_json(history.clone()))
        .expect(1)
        .mount(&backend)
        .await;
    let server = common::proxy(&backend.uri());

    let response = server
        .get("/api/chat/history")
        .add_header("Authorization", BEARER)
        .await;

    response.assert_status_ok();
    response.assert_json(&history);
}

#[tokio::test]
async fn test_send_forwards_body_and_backend_errors() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/send"))
        .and(body_json(json!({ "content": "hi", "role": "user" })))
        .respond_with(ResponseTemplate::new(400).set_body_json(detail("Message too long")))
        .expect(1)
        .mount(&backend)
        .await;
    let server = common::proxy(&backend.uri());

    let response = server
        .post("/api/chat/send")
        .add_header("Authorization", BEARER)
        .json(&json!({ "content": "hi", "role": "user" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&detail("Message too long"));
}

#[tokio::test]
async fn test_mark_plan_maps_to_message_path() {
    let backend = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/chat/message/m42/mark-plan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Message marked as plan",
            "plan_id": 3
        })))
        .expect(1)
        .mount(&backend)
        .await;
    let server = common::proxy(&backend.uri());

    let response = server
        .put("/api/chat/mark-plan/m42")
        .add_header("Authorization", BEARER)
        .json(&json!({ "is_plan": true, "plan_type": "workout" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["plan_id"], 3);
}

#[tokio::test]
async fn test_query_string_is_relayed() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/progress/analysis"))
        .and(query_param("days", "60"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&backend)
        .await;
    let server = common::proxy(&backend.uri());

    let response = server
        .get("/api/v1/progress/analysis")
        .add_query_param("days", 60)
        .add_header("Authorization", BEARER)
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_adaptive_plan_relays_query_parameters() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/progress/adaptive-plan"))
        .and(query_param("plan_type", "diet"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Not enough progress data"
        })))
        .expect(1)
        .mount(&backend)
        .await;
    let server = common::proxy(&backend.uri());

    let response = server
        .post("/api/v1/progress/adaptive-plan")
        .add_query_param("plan_type", "diet")
        .add_header("Authorization", BEARER)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_unreachable_backend_yields_fixed_messages() {
    let server = common::proxy(UNREACHABLE);

    let cases = [
        (server.get("/api/chat/history"), "Internal server error"),
        (server.post("/api/chat/send"), "Internal server error"),
        (server.put("/api/chat/mark-plan/m1"), "Internal server error"),
        (
            server.get("/api/v1/progress/analysis"),
            "Failed to fetch progress analysis",
        ),
        (
            server.post("/api/v1/progress/adaptive-plan"),
            "Failed to generate adaptive plan",
        ),
    ];

    for (request, message) in cases {
        let response = request.add_header("Authorization", BEARER).await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&detail(message));
    }
}

#[tokio::test]
async fn test_non_json_backend_body_is_a_failure() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/progress/analysis"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad gateway</html>"))
        .mount(&backend)
        .await;
    let server = common::proxy(&backend.uri());

    let response = server
        .get("/api/v1/progress/analysis")
        .add_header("Authorization", BEARER)
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&detail("Failed to fetch progress analysis"));
}
