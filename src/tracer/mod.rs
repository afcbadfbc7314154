//! Fail-safe tracing client for the JGT suite
//!
//! The tracer records operation/step/completion events to an external
//! observability backend (Langfuse) without ever letting a tracing failure
//! reach the host application's control flow.
//!
//! # Architecture
//!
//! - **TracerSession**: per-(package, operation-type) state machine exposing
//!   start/step/complete and a scoped-operation form
//! - **TraceSink**: the boundary to the backend; resolved at construction and
//!   optional at runtime; its absence disables tracing without error
//! - **LangfuseSink**: synchronous, best-effort HTTP adapter for the sink
//!
//! # Fail-safe design
//!
//! Two error classes are kept strictly apart. Empty constructor arguments
//! raise a [`crate::error::JgtError::Validation`] error immediately. Every
//! operational fault (configuration loading, environment resolution, sink
//! delivery) is caught at the point of occurrence and degrades to a
//! null/false sentinel, with an optional diagnostic gated by the
//! `fail_silent` configuration flag.
//!
//! # Usage
//!
//! ```rust,no_run
//! use jgtcore::tracer::{ObservationKind, TracerSession};
//! use serde_json::json;
//!
//! let mut tracer = TracerSession::new("jgtpy", "data_processing")?;
//!
//! tracer.start_operation("process_market_data", Some(json!({"symbol": "EURUSD"})), None);
//! tracer.add_step(
//!     "load_data",
//!     Some(json!({"source": "broker"})),
//!     Some(json!({"records": 1000})),
//!     None,
//!     ObservationKind::Event,
//! );
//! tracer.complete_operation(Some(json!({"total_signals": 3})), None);
//! # Ok::<(), jgtcore::JgtError>(())
//! ```

pub mod session;
pub mod sink;

pub use session::{
    create_session_tracer, get_trace_url, is_tracing_enabled, Observation, TracerSession,
    KNOWN_PACKAGES,
};
pub use sink::{
    resolve_sink, LangfuseSink, Metadata, ObservationKind, ObservationRecord, TraceRecord,
    TraceSink,
};
