//! Typed client for the coaching backend REST API
//!
//! Every protected call follows the same contract:
//!
//! 1. read the bearer token from the [`Session`]
//! 2. fail with [`AppError::Auth`] before any I/O when no token is present
//! 3. send the request with `Authorization: Bearer <token>`
//! 4. on a non-2xx status, raise [`AppError::Backend`] carrying the body's
//!    `detail` (or `error`) message, falling back to the status text
//! 5. on success, decode the JSON body into the resource type
//!
//! Calls are made exactly once: no retries, no timeout, no caching.
//!
//! # Example
//!
//! ```rust,ignore
//! use fitcoach::{ApiClient, Session};
//!
//! let client = ApiClient::new("http://localhost:8000", Session::anonymous());
//! client.auth().login("alice", "secret").await?;
//! let plans = client.plans().list().await?;
//! ```

mod auth;
mod chat;
mod plans;
mod profile;
mod progress;

pub use auth::AuthApi;
pub use chat::ChatApi;
pub use plans::PlansApi;
pub use profile::ProfileApi;
pub use progress::{DEFAULT_ANALYSIS_DAYS, DEFAULT_TREND_DAYS, ProgressApi};

use crate::session::Session;
use crate::types::{ApiErrorBody, AppError, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

/// Path prefix of every backend endpoint.
pub const API_PREFIX: &str = "/api/v1";

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Session) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, session)
    }

    /// Client bound to an explicit token instead of a stored session.
    pub fn with_token(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::new(base_url, Session::with_token(token))
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>, session: Session) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { client: self }
    }

    pub fn chat(&self) -> ChatApi<'_> {
        ChatApi { client: self }
    }

    pub fn plans(&self) -> PlansApi<'_> {
        PlansApi { client: self }
    }

    pub fn profile(&self) -> ProfileApi<'_> {
        ProfileApi { client: self }
    }

    pub fn progress(&self) -> ProgressApi<'_> {
        ProgressApi { client: self }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    fn bearer(&self) -> Result<String> {
        self.session
            .token()
            .ok_or_else(|| AppError::Auth("Authentication required".to_string()))
    }

    /// Unauthenticated request builder.
    fn public(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header(ACCEPT, "application/json")
    }

    /// Request builder carrying the session's bearer token.
    fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.bearer()?;
        Ok(self
            .public(method, path)
            .header(AUTHORIZATION, format!("Bearer {}", token)))
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        self.execute_or(request, None).await
    }

    /// Like [`execute`](Self::execute), using `fallback` as the error message
    /// when the backend's error body carries none.
    async fn execute_or<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: Option<&str>,
    ) -> Result<T> {
        let request = request.build()?;
        tracing::debug!(method = %request.method(), url = %request.url(), "Calling backend");

        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.bytes().await?;

        decode(status, &body, fallback)
    }
}

fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8], fallback: Option<&str>) -> Result<T> {
    if !status.is_success() {
        let message = serde_json::from_slice::<ApiErrorBody>(body)
            .ok()
            .and_then(|err| err.message())
            .or_else(|| fallback.map(str::to_string))
            .unwrap_or_else(|| status_text(status));
        tracing::warn!(status = status.as_u16(), %message, "Backend returned an error");
        return Err(AppError::Backend {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(body).map_err(|e| AppError::Decode(e.to_string()))
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()))
}
