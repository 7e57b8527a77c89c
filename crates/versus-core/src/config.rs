use std::str::FromStr;

use crate::app_config::{
    AppConfig, DEFAULT_GROQ_BASE_URL, DEFAULT_GROQ_MODEL, DEFAULT_PERPLEXITY_BASE_URL,
    DEFAULT_PERPLEXITY_MODEL,
};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap` instead of `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        match lookup(var) {
            Ok(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(ConfigError::MissingEnvVar(var.to_string())),
        }
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let groq_api_key = require("GROQ_API_KEY")?;
    let perplexity_api_key = require("PERPLEXITY_API_KEY")?;

    let groq_model = or_default("GROQ_MODEL", DEFAULT_GROQ_MODEL);
    let perplexity_model = or_default("PERPLEXITY_MODEL", DEFAULT_PERPLEXITY_MODEL);
    let groq_base_url = or_default("VERSUS_GROQ_BASE_URL", DEFAULT_GROQ_BASE_URL);
    let perplexity_base_url = or_default("VERSUS_PERPLEXITY_BASE_URL", DEFAULT_PERPLEXITY_BASE_URL);

    let min_items: usize = parse_or(&lookup, "VERSUS_MIN_ITEMS", "2")?;
    let max_items: usize = parse_or(&lookup, "VERSUS_MAX_ITEMS", "5")?;
    if min_items == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "VERSUS_MIN_ITEMS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if min_items > max_items {
        return Err(ConfigError::InvalidEnvVar {
            var: "VERSUS_MAX_ITEMS".to_string(),
            reason: format!("must be >= VERSUS_MIN_ITEMS ({min_items})"),
        });
    }
    let max_additional_searches = parse_or(&lookup, "VERSUS_MAX_ADDITIONAL_SEARCHES", "2")?;

    let json_mode = parse_bool("VERSUS_JSON_MODE", &or_default("VERSUS_JSON_MODE", "true"))?;

    let request_timeout_secs = parse_or(&lookup, "VERSUS_REQUEST_TIMEOUT_SECS", "60")?;
    let max_retries = parse_or(&lookup, "VERSUS_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_or(&lookup, "VERSUS_RETRY_BACKOFF_BASE_MS", "500")?;
    let user_agent = or_default("VERSUS_USER_AGENT", "versus/0.1 (product-comparison)");
    let log_level = or_default("VERSUS_LOG_LEVEL", "info");

    Ok(AppConfig {
        groq_api_key,
        perplexity_api_key,
        groq_model,
        perplexity_model,
        groq_base_url,
        perplexity_base_url,
        min_items,
        max_items,
        max_additional_searches,
        json_mode,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        user_agent,
        log_level,
    })
}

/// Parse a numeric setting, falling back to `default` when unset.
fn parse_or<T, F>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(var).unwrap_or_else(|_| default.to_string());
    raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a boolean flag. Accepts `true/false`, `1/0`, `yes/no`, `on/off`.
fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
