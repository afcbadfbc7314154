//! Environment-variable interpolation over nested configuration values
//!
//! Configuration files may reference environment variables anywhere inside the
//! tracing section using `${NAME}` placeholders, most commonly for credentials:
//!
//! ```json
//! { "langfuse": { "secret_key": "${LANGFUSE_SECRET_KEY}" } }
//! ```
//!
//! Resolution is total (every leaf visited), non-mutating (a new value is
//! returned), and infallible: a placeholder whose variable is unset stays in
//! the output verbatim. Credentials are optional for non-tracing use, so an
//! unresolvable token is a silent no-op rather than an error.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap())
}

/// Resolve `${NAME}` placeholders in a single string against the process
/// environment. Unset variables leave their placeholder unchanged.
pub fn resolve_env_string(input: &str) -> String {
    placeholder_pattern()
        .replace_all(input, |caps: &regex::Captures<'_>| {
            match std::env::var(&caps[1]) {
                Ok(value) => value,
                Err(_) => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Resolve `${NAME}` placeholders throughout a nested configuration value.
///
/// Mappings and sequences are traversed recursively; string scalars are
/// interpolated; all other scalars pass through unchanged. The input is never
/// mutated and no error is ever raised.
pub fn resolve_env_vars(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(resolve_env_string(s)),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), resolve_env_vars(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(resolve_env_vars).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_without_placeholders_is_identity() {
        let input = json!({
            "enabled": true,
            "batch_size": 50,
            "trace_levels": ["INFO", "WARNING"],
            "langfuse": { "host": "https://cloud.langfuse.com" }
        });

        assert_eq!(resolve_env_vars(&input), input);
    }

    #[test]
    fn test_set_variable_is_substituted() {
        std::env::set_var("JGT_RESOLVER_TEST_SET", "X");

        let input = json!("${JGT_RESOLVER_TEST_SET}");
        assert_eq!(resolve_env_vars(&input), json!("X"));
    }

    #[test]
    fn test_unset_variable_is_left_verbatim() {
        std::env::remove_var("JGT_RESOLVER_TEST_UNSET");

        let input = json!("${JGT_RESOLVER_TEST_UNSET}");
        assert_eq!(resolve_env_vars(&input), json!("${JGT_RESOLVER_TEST_UNSET}"));
    }

    #[test]
    fn test_substitution_inside_larger_string() {
        std::env::set_var("JGT_RESOLVER_TEST_HOST", "langfuse.local");

        let input = json!("https://${JGT_RESOLVER_TEST_HOST}/api");
        assert_eq!(resolve_env_vars(&input), json!("https://langfuse.local/api"));
    }

    #[test]
    fn test_nested_structures_are_traversed() {
        std::env::set_var("JGT_RESOLVER_TEST_NESTED", "secret");
        std::env::remove_var("JGT_RESOLVER_TEST_MISSING");

        let input = json!({
            "langfuse": {
                "secret_key": "${JGT_RESOLVER_TEST_NESTED}",
                "public_key": "${JGT_RESOLVER_TEST_MISSING}"
            },
            "hosts": ["${JGT_RESOLVER_TEST_NESTED}", 42, null]
        });

        let resolved = resolve_env_vars(&input);
        assert_eq!(resolved["langfuse"]["secret_key"], json!("secret"));
        assert_eq!(
            resolved["langfuse"]["public_key"],
            json!("${JGT_RESOLVER_TEST_MISSING}")
        );
        assert_eq!(resolved["hosts"], json!(["secret", 42, null]));
    }

    #[test]
    fn test_non_string_scalars_pass_through() {
        let input = json!([true, 1.5, null, -3]);
        assert_eq!(resolve_env_vars(&input), input);
    }

    #[test]
    fn test_input_is_not_mutated() {
        std::env::set_var("JGT_RESOLVER_TEST_IMMUTABLE", "replaced");

        let input = json!({ "key": "${JGT_RESOLVER_TEST_IMMUTABLE}" });
        let _ = resolve_env_vars(&input);
        assert_eq!(input["key"], json!("${JGT_RESOLVER_TEST_IMMUTABLE}"));
    }

    #[test]
    fn test_malformed_placeholders_are_ignored() {
        let input = json!("${} ${1BAD} $NOBRACE ${UNCLOSED");
        assert_eq!(resolve_env_vars(&input), input);
    }
}
