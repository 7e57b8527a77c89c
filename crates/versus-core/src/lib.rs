//! Shared configuration for the Versus workspace.
//!
//! Everything here is provider-agnostic: API credentials, model identifiers,
//! comparison limits and transport tuning. The HTTP client and pipeline crates
//! take their settings from [`AppConfig`].

mod app_config;
mod config;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};

use thiserror::Error;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
