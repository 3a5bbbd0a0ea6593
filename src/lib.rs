//! # fitcoach - AI gym coach client
//!
//! Client side of an AI gym coach: a typed client for the coaching backend,
//! a small pass-through proxy server and the page state controllers that a
//! front end (or the bundled CLI) drives.
//!
//! ## Overview
//!
//! fitcoach can be used in two ways:
//!
//! 1. **As a binary** - `fitcoach serve` runs the proxy, the other
//!    subcommands talk to the backend from the terminal
//! 2. **As a library** - build your own front end on [`ApiClient`] and the
//!    controllers in [`state`]
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use fitcoach::state::{Flow, PlansPage};
//! use fitcoach::{ApiClient, Session};
//!
//! #[tokio::main]
//! async fn main() -> fitcoach::Result<()> {
//!     let client = ApiClient::new("http://localhost:8000", Session::anonymous());
//!     client.auth().login("alice", "secret").await?;
//!
//!     let mut page = PlansPage::default();
//!     if page.mount(&client).await == Flow::Stay {
//!         for plan in page.visible() {
//!             println!("{} {}", plan.id, plan.plan_type);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`client`] - Typed REST client, one handle per resource
//! - [`session`] - Bearer token storage
//! - [`state`] - Page state controllers (chat, plans, profile, progress)
//! - [`api`] - Proxy routes and handlers
//! - [`auth`] - Authorization header middleware for the proxy
//! - [`cli`] - Command-line interface
//! - [`types`] - Wire types and error handling
//!
//! ## Configuration
//!
//! Settings come from `fitcoach.toml`, overridden by environment variables
//! (`BACKEND_URL`, `HOST`, `PORT`, `FITCOACH_TOKEN_FILE`). A `.env` file is
//! loaded first when present.

#![warn(rustdoc::missing_crate_level_docs)]

/// Proxy routes, handlers and the relay.
pub mod api;
/// Authorization middleware for the proxy.
pub mod auth;
/// Command-line interface.
pub mod cli;
/// Typed backend API client.
pub mod client;
/// Session token storage.
pub mod session;
/// Page state controllers.
pub mod state;
/// Core types (resources, requests, errors).
pub mod types;
/// Configuration utilities (TOML).
pub mod utils;

// Re-export commonly used types
pub use client::ApiClient;
pub use session::{FileTokenStore, MemoryTokenStore, Session, TokenStore};
pub use types::{AppError, Result};
pub use utils::toml_config::FitcoachConfig;

use std::sync::Arc;

/// Application state shared across proxy handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved configuration
    pub config: Arc<FitcoachConfig>,
    /// Outbound HTTP client used for relaying to the backend
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: FitcoachConfig) -> Self {
        Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }
}
