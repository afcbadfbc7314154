//! Configuration file loading and tracing-section resolution
//!
//! The loader reads a JSON configuration file (an explicit path, or the first
//! of a few well-known locations), extracts its `tracing` section, runs
//! environment interpolation over it, and backfills every missing field with
//! its default. Only an explicitly requested path may produce an error;
//! falling back to defaults is always silent.

use super::env_resolver::resolve_env_vars;
use super::tracing::TracingConfig;
use crate::error::{JgtError, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming an explicit configuration file location.
pub const CONFIG_PATH_ENV: &str = "JGT_CONFIG_PATH";

/// Environment file holding sink credentials, probed by `setup_environment`.
const ENV_FILE_NAME: &str = ".env.caishen";

/// Candidate configuration locations, in probe order.
fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
        if !explicit.is_empty() {
            paths.push(PathBuf::from(explicit));
        }
    }
    paths.push(PathBuf::from("config.json"));
    if let Some(home) = std::env::var_os("HOME") {
        paths.push(Path::new(&home).join(".jgt").join("config.json"));
    }
    paths
}

fn parse_config_file(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)?;
    let value: Value =
        serde_json::from_str(&contents).map_err(|e| JgtError::ConfigParse(e.to_string()))?;
    if !value.is_object() {
        return Err(JgtError::ConfigParse(format!(
            "{}: top-level value must be an object",
            path.display()
        )));
    }
    Ok(value)
}

/// Read the application configuration.
///
/// With an explicit path, a missing or malformed file is an error
/// ([`JgtError::ConfigNotFound`] / [`JgtError::ConfigParse`]). With no path,
/// the well-known locations are probed and an empty mapping is returned
/// silently when none exists.
pub fn read_config(path: Option<&Path>) -> Result<Value> {
    if let Some(path) = path {
        if !path.exists() {
            return Err(JgtError::ConfigNotFound(path.to_path_buf()));
        }
        return parse_config_file(path);
    }

    for candidate in config_search_paths() {
        if candidate.exists() {
            match parse_config_file(&candidate) {
                Ok(value) => {
                    debug!(path = %candidate.display(), "loaded configuration");
                    return Ok(value);
                }
                Err(e) => {
                    warn!(path = %candidate.display(), error = %e, "skipping unreadable configuration file");
                }
            }
        }
    }

    Ok(Value::Object(serde_json::Map::new()))
}

/// Resolve the effective tracing configuration from an already-loaded
/// configuration value.
///
/// Extracts the `tracing` key (absent is treated as empty), interpolates
/// `${VAR}` placeholders against the process environment, and backfills
/// defaults. Idempotent and side-effect-free; any internal fault degrades to
/// a disabled configuration rather than an error.
pub fn get_tracing_config(config: Option<&Value>) -> TracingConfig {
    let loaded;
    let config = match config {
        Some(value) => value,
        None => {
            loaded = read_config(None).unwrap_or(Value::Null);
            &loaded
        }
    };

    let section = config
        .get("tracing")
        .cloned()
        .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
    let resolved = resolve_env_vars(&section);

    match serde_json::from_value(resolved) {
        Ok(tracing_config) => tracing_config,
        Err(e) => {
            warn!(error = %e, "invalid tracing configuration, tracing disabled");
            TracingConfig::disabled()
        }
    }
}

/// Load the effective tracing configuration from the default file locations.
pub fn resolve_tracing_config() -> TracingConfig {
    get_tracing_config(None)
}

/// Best-effort load of the `.env.caishen` credentials file from the working
/// directory, then the home directory. Variables already present in the
/// environment are not overwritten. Never fails.
pub fn setup_environment() {
    let mut candidates = vec![PathBuf::from(ENV_FILE_NAME)];
    if let Some(home) = std::env::var_os("HOME") {
        candidates.push(Path::new(&home).join(ENV_FILE_NAME));
    }

    for candidate in candidates {
        if candidate.exists() {
            match dotenv::from_path(&candidate) {
                Ok(()) => debug!(path = %candidate.display(), "loaded environment file"),
                Err(e) => debug!(path = %candidate.display(), error = %e, "ignoring unreadable environment file"),
            }
        }
    }
}
