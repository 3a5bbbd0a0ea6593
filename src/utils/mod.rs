/// TOML and environment configuration.
pub mod toml_config;

/// Tracing subscriber setup.
pub mod logging;
