use crate::AppState;
use crate::types::{AppError, Result};
use axum::{
    Json,
    body::to_bytes,
    extract::Request,
    http::{HeaderMap, HeaderName, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::Value;

/// Headers that describe the inbound connection rather than the request.
const SKIPPED_HEADERS: [HeaderName; 11] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::HOST,
    header::CONTENT_LENGTH,
    header::ACCEPT_ENCODING,
];

/// Relay `req` to `upstream_path` on the backend and hand back its status and
/// JSON body unchanged.
///
/// Method, headers, query string and body are forwarded as-is. A transport
/// failure or a body that is not JSON becomes [`AppError::Relay`], which
/// renders as `500 {"detail": failure_message}`.
pub async fn forward(
    state: &AppState,
    upstream_path: &str,
    failure_message: &'static str,
    req: Request,
) -> Result<Response> {
    let (status, body) = relay(state, upstream_path, req).await.map_err(|reason| {
        tracing::error!(upstream = upstream_path, %reason, "Proxy request failed");
        AppError::Relay(failure_message)
    })?;
    Ok((status, Json(body)).into_response())
}

async fn relay(state: &AppState, upstream_path: &str, req: Request) -> Result<(StatusCode, Value)> {
    let (parts, body) = req.into_parts();

    let mut url = format!("{}{}", state.config.backend_url(), upstream_path);
    if let Some(query) = parts.uri.query() {
        url.push('?');
        url.push_str(query);
    }

    let body = to_bytes(body, state.config.server.body_limit_bytes)
        .await
        .map_err(|e| AppError::InvalidInput(format!("failed to read request body: {}", e)))?;

    tracing::debug!(method = %parts.method, %url, "Forwarding to backend");

    let response = state
        .http
        .request(parts.method, &url)
        .headers(forwarded_headers(&parts.headers))
        .body(body)
        .send()
        .await?;

    let status = response.status();
    let bytes = response.bytes().await?;
    let value = serde_json::from_slice(&bytes).map_err(|e| {
        AppError::Decode(format!("backend returned non-JSON body ({}): {}", status, e))
    })?;

    Ok((status, value))
}

fn forwarded_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = inbound.clone();
    for name in &SKIPPED_HEADERS {
        headers.remove(name);
    }
    headers
}
