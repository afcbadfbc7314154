//! Layered application settings store
//!
//! A simpler companion to the configuration loader: a flat-ish key/value
//! store assembled from built-in defaults, an optional JSON settings file,
//! and `JGT_*` environment overrides, in that precedence order. The rest of
//! the JGT suite reads its runtime knobs from here; the tracer only consumes
//! the configuration loader's output.

use crate::error::{JgtError, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Prefix for environment-variable overrides. `JGT_DEMO=false` overrides the
/// `demo` key.
pub const SETTINGS_ENV_PREFIX: &str = "JGT_";

/// Environment variables with the prefix that are not settings overrides.
const RESERVED_ENV_KEYS: &[&str] = &["JGT_CONFIG_PATH"];

fn settings_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![Path::new(".jgt").join("settings.json")];
    if let Some(home) = std::env::var_os("HOME") {
        paths.push(Path::new(&home).join(".jgt").join("settings.json"));
    }
    paths
}

fn builtin_defaults() -> Map<String, Value> {
    let mut defaults = Map::new();
    defaults.insert("demo".to_string(), Value::Bool(true));
    defaults.insert("quiet".to_string(), Value::Bool(false));
    defaults
}

/// Coerce an environment-variable string into the closest JSON value, so
/// `JGT_DEMO=false` arrives as a boolean and `JGT_RETRIES=3` as a number.
fn coerce_env_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(v @ (Value::Bool(_) | Value::Number(_) | Value::Null)) => v,
        _ => Value::String(raw.to_string()),
    }
}

/// Layered key/value settings: defaults, then file, then environment.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    values: Map<String, Value>,
}

impl SettingsStore {
    /// Load settings from an explicit file, or from the well-known locations.
    ///
    /// With an explicit path, a missing or malformed file is an error. With
    /// no path, missing files are skipped silently and defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut values = builtin_defaults();

        if let Some(path) = path {
            if !path.exists() {
                return Err(JgtError::ConfigNotFound(path.to_path_buf()));
            }
            merge_file(&mut values, path, true)?;
        } else {
            for candidate in settings_search_paths() {
                if candidate.exists() {
                    merge_file(&mut values, &candidate, false)?;
                    break;
                }
            }
        }

        apply_env_overrides(&mut values);
        Ok(Self { values })
    }

    /// Get a raw settings value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Get a string-valued setting.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Get a boolean-valued setting.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    /// Get an integer-valued setting.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(Value::as_i64)
    }

    /// Update a setting in memory. The change is not written back to disk.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Whether the suite is running against a demo account.
    pub fn is_demo_mode(&self) -> bool {
        self.get_bool("demo").unwrap_or(true)
    }

    /// Number of settings currently held.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store holds no settings.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn merge_file(values: &mut Map<String, Value>, path: &Path, strict: bool) -> Result<()> {
    let contents = std::fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&contents) {
        Ok(Value::Object(map)) => {
            debug!(path = %path.display(), "loaded settings file");
            for (key, value) in map {
                values.insert(key, value);
            }
            Ok(())
        }
        Ok(_) => {
            let err = JgtError::ConfigParse(format!(
                "{}: top-level value must be an object",
                path.display()
            ));
            if strict {
                Err(err)
            } else {
                warn!(path = %path.display(), error = %err, "skipping unreadable settings file");
                Ok(())
            }
        }
        Err(e) => {
            if strict {
                Err(JgtError::ConfigParse(e.to_string()))
            } else {
                warn!(path = %path.display(), error = %e, "skipping unreadable settings file");
                Ok(())
            }
        }
    }
}

fn apply_env_overrides(values: &mut Map<String, Value>) {
    for (name, raw) in std::env::vars() {
        if RESERVED_ENV_KEYS.contains(&name.as_str()) {
            continue;
        }
        if let Some(key) = name.strip_prefix(SETTINGS_ENV_PREFIX) {
            if key.is_empty() {
                continue;
            }
            values.insert(key.to_lowercase(), coerce_env_value(&raw));
        }
    }
}
