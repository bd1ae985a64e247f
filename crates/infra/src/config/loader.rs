//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Environment variables, when `MOPLE_API_BASE_URL` is set
//! 2. Otherwise the first config file found by [`probe_config_paths`]
//!
//! ## Environment Variables
//! - `MOPLE_API_BASE_URL`: API base URL (required for environment loading)
//! - `MOPLE_API_TIMEOUT_SECS`: per-call timeout in seconds
//! - `MOPLE_API_CONNECT_TIMEOUT_SECS`: connect timeout in seconds
//! - `MOPLE_REFRESH_PATH`: token refresh endpoint path
//! - `MOPLE_REFRESH_HEADER`: header carrying the refresh token
//! - `MOPLE_USER_AGENT`: user agent sent with every call
//! - `MOPLE_STORE_READ_TIMEOUT_MS`: bound for blocking credential reads
//! - `MOPLE_STORAGE_PATH`: preferences file (memory only when unset)
//! - `MOPLE_LOG_FILTER`: tracing filter directives
//! - `MOPLE_LOG_JSON`: JSON log output (true/false)
//!
//! Unset optional variables keep their defaults.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use mople_domain::{Config, MopleError, Result};
use tracing::{debug, info};

use crate::errors::InfraError;

const CONFIG_FILE_NAMES: [&str; 4] = ["mople.toml", "mople.json", "config.toml", "config.json"];

/// Load configuration from the environment, falling back to a config file.
///
/// # Errors
/// Returns `MopleError::Config` if neither source yields a valid configuration
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            debug!(error = %e, "Environment configuration unavailable, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from `MOPLE_*` environment variables.
///
/// # Errors
/// Returns `MopleError::Config` if `MOPLE_API_BASE_URL` is missing, a value
/// does not parse, or the result fails validation.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.api.base_url = env_var("MOPLE_API_BASE_URL")?;
    if let Some(secs) = env_parse("MOPLE_API_TIMEOUT_SECS")? {
        config.api.timeout_secs = secs;
    }
    if let Some(secs) = env_parse("MOPLE_API_CONNECT_TIMEOUT_SECS")? {
        config.api.connect_timeout_secs = secs;
    }
    if let Some(path) = env_opt("MOPLE_REFRESH_PATH") {
        config.api.refresh_path = path;
    }
    if let Some(header) = env_opt("MOPLE_REFRESH_HEADER") {
        config.api.refresh_header = header;
    }
    if let Some(agent) = env_opt("MOPLE_USER_AGENT") {
        config.api.user_agent = Some(agent);
    }

    if let Some(ms) = env_parse("MOPLE_STORE_READ_TIMEOUT_MS")? {
        config.storage.read_timeout_ms = ms;
    }
    config.storage.path = env_opt("MOPLE_STORAGE_PATH");

    if let Some(filter) = env_opt("MOPLE_LOG_FILTER") {
        config.logging.filter = filter;
    }
    config.logging.json = env_bool("MOPLE_LOG_JSON", config.logging.json);

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file, probing standard locations when `path`
/// is `None`. JSON or TOML is chosen by extension.
///
/// # Errors
/// Returns `MopleError::Config` if no file is found, it cannot be read or
/// parsed, or the result fails validation.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) if !p.exists() => {
            return Err(MopleError::Config(format!("Config file not found: {}", p.display())));
        }
        Some(p) => p,
        None => probe_config_paths().ok_or_else(|| {
            MopleError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| MopleError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents)
            .map_err(|e| MopleError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(MopleError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file among the standard locations.
///
/// Checks `mople.{toml,json}` then `config.{toml,json}` in the working
/// directory and its two parents, then next to the executable.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.extend(cwd.ancestors().take(3).map(Path::to_path_buf));
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

fn env_var(key: &str) -> Result<String> {
    env_opt(key)
        .ok_or_else(|| MopleError::Config(format!("Missing required environment variable: {key}")))
}

/// Set, non-blank environment variable.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| MopleError::Config(format!("Invalid {key} '{raw}': {e}")))
        })
        .transpose()
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    env_opt(key)
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
