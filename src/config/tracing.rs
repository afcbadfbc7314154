//! Tracing configuration shape and defaults
//!
//! Every field carries a hard-coded default so that a missing key in the
//! `tracing` section of the configuration file is backfilled rather than left
//! absent. The `langfuse` sub-section holds the sink credentials, typically
//! populated through `${VAR}` placeholders.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_PROJECT_NAME: &str = "jgt-trading-ecosystem";
pub const DEFAULT_SESSION_PREFIX: &str = "jgt_session";
pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_BATCH_SIZE: u32 = 50;
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Effective tracing configuration after defaults, file values, and
/// environment interpolation have been merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_project_name")]
    pub project_name: String,

    #[serde(default = "default_session_prefix")]
    pub session_prefix: String,

    #[serde(default = "default_environment")]
    pub environment: String,

    /// Forwarded to the sink as a hint; the core performs no batching.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Forwarded to the sink as a hint; applied to the HTTP client timeout.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// When true (the default), sink failures are swallowed without a
    /// diagnostic. When false, each failure emits a warning.
    #[serde(default = "default_fail_silent")]
    pub fail_silent: bool,

    #[serde(default = "default_trace_levels")]
    pub trace_levels: BTreeSet<String>,

    /// Packages for which tracing is disabled regardless of `enabled`.
    #[serde(default)]
    pub excluded_packages: BTreeSet<String>,

    #[serde(default)]
    pub langfuse: LangfuseConfig,
}

/// Credentials and endpoints for the Langfuse backend. All optional: a
/// missing credential disables the sink rather than failing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LangfuseConfig {
    #[serde(default)]
    pub secret_key: Option<String>,

    #[serde(default)]
    pub public_key: Option<String>,

    #[serde(default)]
    pub host: Option<String>,

    /// Base URL for the trace viewer, used by `get_trace_url`.
    #[serde(default)]
    pub trace_url: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            project_name: default_project_name(),
            session_prefix: default_session_prefix(),
            environment: default_environment(),
            batch_size: default_batch_size(),
            timeout_ms: default_timeout_ms(),
            fail_silent: default_fail_silent(),
            trace_levels: default_trace_levels(),
            excluded_packages: BTreeSet::new(),
            langfuse: LangfuseConfig::default(),
        }
    }
}

impl TracingConfig {
    /// The degraded configuration used when loading fails entirely: tracing
    /// off, failures silent.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_project_name() -> String {
    DEFAULT_PROJECT_NAME.to_string()
}

fn default_session_prefix() -> String {
    DEFAULT_SESSION_PREFIX.to_string()
}

fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.to_string()
}

fn default_batch_size() -> u32 {
    DEFAULT_BATCH_SIZE
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_fail_silent() -> bool {
    true
}

fn default_trace_levels() -> BTreeSet<String> {
    ["INFO", "WARNING", "ERROR"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();

        assert!(config.enabled);
        assert_eq!(config.project_name, "jgt-trading-ecosystem");
        assert_eq!(config.session_prefix, "jgt_session");
        assert_eq!(config.environment, "development");
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.timeout_ms, 5000);
        assert!(config.fail_silent);
        assert_eq!(config.trace_levels.len(), 3);
        assert!(config.excluded_packages.is_empty());
        assert!(config.langfuse.secret_key.is_none());
    }

    #[test]
    fn test_missing_keys_are_backfilled() {
        let config: TracingConfig = serde_json::from_value(json!({
            "enabled": false,
            "environment": "production"
        }))
        .unwrap();

        assert!(!config.enabled);
        assert_eq!(config.environment, "production");
        // Everything not supplied falls back to its default.
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.session_prefix, "jgt_session");
        assert!(config.fail_silent);
    }

    #[test]
    fn test_langfuse_section_parses() {
        let config: TracingConfig = serde_json::from_value(json!({
            "langfuse": {
                "secret_key": "sk-test",
                "public_key": "pk-test",
                "host": "https://cloud.langfuse.com",
                "trace_url": "https://cloud.langfuse.com/trace"
            }
        }))
        .unwrap();

        assert_eq!(config.langfuse.secret_key.as_deref(), Some("sk-test"));
        assert_eq!(
            config.langfuse.trace_url.as_deref(),
            Some("https://cloud.langfuse.com/trace")
        );
    }

    #[test]
    fn test_disabled_config() {
        let config = TracingConfig::disabled();
        assert!(!config.enabled);
        assert!(config.fail_silent);
    }
}
