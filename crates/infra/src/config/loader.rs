//! Configuration loader
//!
//! Loads connector configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the token is not set there, falls back to loading from file
//! 3. Probes the working directory and its parents for config files
//! 4. Supports JSON and TOML formats
//! 5. Validates the result before returning it
//!
//! ## Environment Variables
//! - `HUBSPOT_SYNC_TOKEN`: Access token (required)
//! - `HUBSPOT_SYNC_USER_STATUS`: Sync user status (true/false, default false)
//! - `HUBSPOT_SYNC_BASE_URL`: API root
//! - `HUBSPOT_SYNC_PAGE_SIZE`: Page size for user listings (1-100)
//! - `HUBSPOT_SYNC_TIMEOUT_SECS`: Per-request timeout in seconds
//!
//! ## File Locations
//! The loader probes, in order:
//! 1. `./hubspot-sync.toml` or `./hubspot-sync.json` (current working
//!    directory)
//! 2. The same names in every parent directory
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use hubspot_sync_domain::{ConnectorConfig, ConnectorError, Result};

pub const TOKEN_VAR: &str = "HUBSPOT_SYNC_TOKEN";
pub const USER_STATUS_VAR: &str = "HUBSPOT_SYNC_USER_STATUS";
pub const BASE_URL_VAR: &str = "HUBSPOT_SYNC_BASE_URL";
pub const PAGE_SIZE_VAR: &str = "HUBSPOT_SYNC_PAGE_SIZE";
pub const TIMEOUT_VAR: &str = "HUBSPOT_SYNC_TIMEOUT_SECS";

const CONFIG_FILE_NAMES: [&str; 2] = ["hubspot-sync.toml", "hubspot-sync.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the token is not
/// set, falls back to loading from a config file.
///
/// # Errors
/// Returns `ConnectorError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded configuration fails validation
pub fn load() -> Result<ConnectorConfig> {
    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) if std::env::var_os(TOKEN_VAR).is_none() => {
            tracing::debug!(error = %e, "token not set in environment, trying file");
            load_from_file(None)?
        }
        Err(e) => return Err(e),
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// Only the token is required; every other variable falls back to its
/// default.
///
/// # Errors
/// Returns `ConnectorError::Config` if the token is missing or a variable
/// has an invalid value.
pub fn load_from_env() -> Result<ConnectorConfig> {
    let mut config = ConnectorConfig::new(env_var(TOKEN_VAR)?);

    config.user_status = env_bool(USER_STATUS_VAR, config.user_status);

    if let Ok(base_url) = std::env::var(BASE_URL_VAR) {
        config.base_url = base_url;
    }
    if let Some(page_size) = env_parse::<u32>(PAGE_SIZE_VAR, "page size")? {
        config.page_size = page_size;
    }
    if let Some(timeout) = env_parse::<u64>(TIMEOUT_VAR, "request timeout")? {
        config.request_timeout_secs = timeout;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ConnectorError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<ConnectorConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConnectorError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ConnectorError::Config(format!(
                "{TOKEN_VAR} is not set and no {} or {} was found",
                CONFIG_FILE_NAMES[0], CONFIG_FILE_NAMES[1]
            ))
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ConnectorError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `ConnectorError::Config` if format is invalid or parsing fails.
pub fn parse_config(contents: &str, path: &Path) -> Result<ConnectorConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ConnectorError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ConnectorError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ConnectorError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a configuration file
///
/// Starts at the current working directory and walks up its parents, then
/// tries the executable's directory.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let from_cwd = std::env::current_dir().ok().and_then(|cwd| probe_config_paths_from(&cwd));

    from_cwd.or_else(|| {
        let exe_path = std::env::current_exe().ok()?;
        let exe_dir = exe_path.parent()?;
        let found = candidates_in(exe_dir).find(|path| path.is_file());
        found
    })
}

/// Probe `start` and each of its ancestors for a configuration file.
pub fn probe_config_paths_from(start: &Path) -> Option<PathBuf> {
    start.ancestors().flat_map(candidates_in).find(|path| path.is_file())
}

fn candidates_in(dir: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name))
}

/// Get required environment variable
///
/// # Errors
/// Returns `ConnectorError::Config` if the variable is not set or empty.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty()).ok_or_else(|| {
        ConnectorError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional environment variable
fn env_parse<T>(key: &str, what: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConnectorError::Config(format!("Invalid {what} in {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
