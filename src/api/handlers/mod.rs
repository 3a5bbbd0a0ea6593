//! Proxy route handlers.
//!
//! Each handler relays its request to a fixed backend path and only differs
//! in the failure message returned when the backend cannot be reached.

/// Chat history, send and mark-plan relays.
pub mod chat;
/// Progress analysis and adaptive plan relays.
pub mod progress;

/// Liveness probe; answered locally.
pub async fn health() -> &'static str {
    "OK"
}
