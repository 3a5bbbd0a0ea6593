use crate::types::{AppError, Result};
use axum::{extract::Request, http::header, middleware::Next, response::Response};

/// Rejects requests that carry no `Authorization` header.
///
/// The header value is not inspected; the backend validates the token.
pub async fn require_authorization(req: Request, next: Next) -> Result<Response> {
    let present = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|value| !value.trim().is_empty());

    if !present {
        tracing::debug!(path = %req.uri().path(), "Rejected request without Authorization header");
        return Err(AppError::Auth("Authorization header is required".to_string()));
    }

    Ok(next.run(req).await)
}
