//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If no credentials are set there, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `WIKIBASE_API_URL`: Action API endpoint
//! - `WIKIBASE_CONSUMER_KEY`, `WIKIBASE_CONSUMER_SECRET`,
//!   `WIKIBASE_ACCESS_TOKEN`, `WIKIBASE_ACCESS_SECRET`: OAuth credentials
//! - `WIKIBASE_BOT_USERNAME`, `WIKIBASE_BOT_PASSWORD`: bot password login
//! - `WIKIBASE_IS_BOT`: Mark edits as bot edits (true/false)
//! - `WIKIBASE_SUMMARY`: Default edit summary
//! - `WIKIBASE_MAXLAG`: Replication lag limit in seconds
//!
//! ## File Locations
//! The loader searches the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./wikibase.json` or `./wikibase.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};

use wikibase_domain::{LoginCredentials, OAuthCredentials, Result, WikibaseConfig, WikibaseError};

const OAUTH_VARS: [&str; 4] = [
    "WIKIBASE_CONSUMER_KEY",
    "WIKIBASE_CONSUMER_SECRET",
    "WIKIBASE_ACCESS_TOKEN",
    "WIKIBASE_ACCESS_SECRET",
];
const LOGIN_VARS: [&str; 2] = ["WIKIBASE_BOT_USERNAME", "WIKIBASE_BOT_PASSWORD"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If no credentials are
/// set there, falls back to loading from a config file.
///
/// # Errors
/// Returns `WikibaseError::Configuration` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
pub fn load() -> Result<WikibaseConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// A credential bundle is picked up when any of its variables is set;
/// incomplete bundles are reported later by the credential resolver.
/// Everything else falls back to the defaults.
///
/// # Errors
/// Returns `WikibaseError::Configuration` if no credential variable is set
/// or a value cannot be parsed.
pub fn load_from_env() -> Result<WikibaseConfig> {
    let oauth_credentials = if any_set(&OAUTH_VARS) {
        Some(OAuthCredentials {
            consumer_key: env_or_empty("WIKIBASE_CONSUMER_KEY"),
            consumer_secret: env_or_empty("WIKIBASE_CONSUMER_SECRET"),
            access_token: env_or_empty("WIKIBASE_ACCESS_TOKEN"),
            access_secret: env_or_empty("WIKIBASE_ACCESS_SECRET"),
        })
    } else {
        None
    };
    let login_credentials = if any_set(&LOGIN_VARS) {
        Some(LoginCredentials {
            bot_username: env_or_empty("WIKIBASE_BOT_USERNAME"),
            bot_password: env_or_empty("WIKIBASE_BOT_PASSWORD"),
        })
    } else {
        None
    };
    if oauth_credentials.is_none() && login_credentials.is_none() {
        return Err(WikibaseError::Configuration(
            "No credentials found in environment variables".to_string(),
        ));
    }

    let defaults = WikibaseConfig::default();
    let maxlag = match std::env::var("WIKIBASE_MAXLAG") {
        Ok(raw) => Some(raw.trim().parse::<u32>().map_err(|e| {
            WikibaseError::Configuration(format!("Invalid WIKIBASE_MAXLAG: {}", e))
        })?),
        Err(_) => None,
    };

    Ok(WikibaseConfig {
        api_url: std::env::var("WIKIBASE_API_URL").unwrap_or(defaults.api_url),
        oauth_credentials,
        login_credentials,
        is_bot: env_bool("WIKIBASE_IS_BOT", defaults.is_bot),
        summary: std::env::var("WIKIBASE_SUMMARY").unwrap_or(defaults.summary),
        maxlag,
        ..defaults
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, searches several locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `WikibaseError::Configuration` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<WikibaseConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(WikibaseError::Configuration(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_path().ok_or_else(|| {
            WikibaseError::Configuration(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| WikibaseError::Configuration(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, by file extension.
fn parse_config(contents: &str, path: &Path) -> Result<WikibaseConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| WikibaseError::Configuration(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| WikibaseError::Configuration(format!("Invalid JSON format: {}", e))),
        _ => Err(WikibaseError::Configuration(format!(
            "Unsupported config format: {}",
            extension
        ))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, its two parents, then the same
/// locations relative to the executable.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_path() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("wikibase.json"),
        dir.join("wikibase.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

fn any_set(keys: &[&str]) -> bool {
    keys.iter().any(|key| std::env::var(key).is_ok())
}

fn env_or_empty(key: &str) -> String {
    std::env::var(key).unwrap_or_default()
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
