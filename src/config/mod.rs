//! Layered configuration resolution
//!
//! Configuration is merged from three layers in increasing precedence:
//! built-in defaults, the on-disk configuration file, and environment-variable
//! interpolation of `${VAR}` placeholders. The tracing section is the part of
//! the file this crate owns; the rest of the mapping is passed through to the
//! host application untouched.

pub mod env_resolver;
pub mod loader;
pub mod tracing;

pub use env_resolver::{resolve_env_string, resolve_env_vars};
pub use loader::{get_tracing_config, read_config, resolve_tracing_config, setup_environment};
pub use self::tracing::{LangfuseConfig, TracingConfig};
