pub mod config;
pub mod error;
pub mod settings;
pub mod tracer;

pub use error::{JgtError, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::{
        get_tracing_config, read_config, resolve_tracing_config, setup_environment, TracingConfig,
    };
    pub use crate::error::{JgtError, Result};
    pub use crate::settings::SettingsStore;
    pub use crate::tracer::{
        create_session_tracer, get_trace_url, is_tracing_enabled, ObservationKind, TraceSink,
        TracerSession,
    };
}
