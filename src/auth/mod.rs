//! Authorization gate for the proxy routes
//!
//! The proxy never verifies tokens itself. It only checks that an
//! `Authorization` header is present before relaying a request:
//!
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! Requests without the header are answered locally with
//! `401 {"detail": "Authorization header is required"}`.
//!
//! # Usage
//!
//! ```ignore
//! use axum::{Router, middleware, routing::get};
//! use fitcoach::auth::middleware::require_authorization;
//!
//! let app = Router::new()
//!     .route("/protected", get(handler))
//!     .layer(middleware::from_fn(require_authorization));
//! ```

/// Middleware enforcing the presence of the `Authorization` header.
pub mod middleware;
