//! TOML-based configuration for fitcoach
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. built-in defaults
//! 2. an optional `fitcoach.toml` file
//! 3. environment variables (after loading `.env` through `dotenvy`)
//!
//! | Variable | Setting |
//! |----------|---------|
//! | `BACKEND_URL` | `backend.url` |
//! | `NEXT_PUBLIC_BACKEND_URL` | `backend.url` when `BACKEND_URL` is unset |
//! | `HOST` | `server.host` |
//! | `PORT` | `server.port` |
//! | `FITCOACH_TOKEN_FILE` | `session.token_file` |

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "fitcoach.toml";

/// Root configuration structure loaded from fitcoach.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitcoachConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

// ============= Server Configuration =============

/// Proxy server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Largest inbound request body the proxy accepts
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

// ============= Backend Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the coaching backend, without the `/api/v1` prefix
    #[serde(default = "default_backend_url")]
    pub url: String,
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
        }
    }
}

// ============= Session Configuration =============

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Where the terminal client keeps its token. Defaults to the user config dir.
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

// ============= UI Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// How long mutation banners stay visible
    #[serde(default = "default_banner_ms")]
    pub banner_ms: u64,

    /// Success banner duration on the progress form
    #[serde(default = "default_form_banner_ms")]
    pub form_banner_ms: u64,
}

fn default_banner_ms() -> u64 {
    3000
}

fn default_form_banner_ms() -> u64 {
    1500
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            banner_ms: default_banner_ms(),
            form_banner_ms: default_form_banner_ms(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid value for {0}: {1}")]
    InvalidEnv(String, String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for crate::types::AppError {
    fn from(err: ConfigError) -> Self {
        crate::types::AppError::Config(err.to_string())
    }
}

impl FitcoachConfig {
    /// Load configuration from a TOML file. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load file, `.env` and environment, then validate the result.
    pub fn resolve<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = Self::load(path)?;
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment-style overrides using `lookup` to read variables.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("BACKEND_URL").or_else(|| lookup("NEXT_PUBLIC_BACKEND_URL")) {
            self.backend.url = url;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidEnv("PORT".to_string(), port.clone()))?;
        }
        if let Some(path) = lookup("FITCOACH_TOKEN_FILE") {
            self.session.token_file = Some(PathBuf::from(path));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.backend.url.trim();
        if url.is_empty() {
            return Err(ConfigError::ValidationError(
                "backend.url must not be empty".to_string(),
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "backend.url must start with http:// or https://, got '{}'",
                url
            )));
        }
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Backend base URL without a trailing slash.
    pub fn backend_url(&self) -> &str {
        self.backend.url.trim().trim_end_matches('/')
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn token_file(&self) -> Option<PathBuf> {
        self.session
            .token_file
            .clone()
            .or_else(crate::session::FileTokenStore::default_path)
    }
}
