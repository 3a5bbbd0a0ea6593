//! Pass-through proxy routes
//!
//! A thin axum service that relays a handful of browser-facing routes to the
//! coaching backend. It holds no state and makes no decisions beyond checking
//! that an `Authorization` header is present.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - One handler per relayed route
//! - [`api::relay`](crate::api::relay) - Request forwarding and response relaying
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # Routes
//!
//! ## Chat (`/api/chat`)
//! - `GET /api/chat/history` → `GET /api/v1/chat/history`
//! - `POST /api/chat/send` → `POST /api/v1/chat/send`
//! - `PUT /api/chat/mark-plan/{message_id}` → `PUT /api/v1/chat/message/{message_id}/mark-plan`
//!
//! ## Progress (`/api/v1/progress`)
//! - `GET /api/v1/progress/analysis` → same path upstream
//! - `POST /api/v1/progress/adaptive-plan` → same path upstream
//!
//! ## Health
//! - `GET /health` - Answered locally with `OK`
//!
//! # Status and Errors
//!
//! The backend's status code and JSON body are returned untouched, 4xx
//! included. When the backend is unreachable or answers with something other
//! than JSON, the route replies `500 {"detail": "<route message>"}`:
//!
//! | Route | Message |
//! |-------|---------|
//! | chat routes | `Internal server error` |
//! | progress analysis | `Failed to fetch progress analysis` |
//! | adaptive plan | `Failed to generate adaptive plan` |

/// Request handlers for the relayed routes.
pub mod handlers;
/// Forwarding of inbound requests to the backend.
pub mod relay;
/// Router configuration and route definitions.
pub mod routes;
