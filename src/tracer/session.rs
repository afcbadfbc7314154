//! Tracer session state machine
//!
//! A [`TracerSession`] is constructed once per `(package, operation_type)`
//! family and reused across start/complete cycles. It owns at most one active
//! trace at a time and an observation list for that trace only. Every sink
//! interaction passes through a single fail-safe wrapper: tracing is an
//! advisory side channel, and a host application observes either full tracing
//! or silent no-ops, never a crash from this subsystem.

use super::sink::{
    resolve_sink, Metadata, ObservationKind, ObservationRecord, TraceRecord, TraceSink,
};
use crate::config::{resolve_tracing_config, TracingConfig};
use crate::error::{JgtError, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Packages known to the JGT suite. Construction with any other package name
/// is accepted but emits a warning.
pub const KNOWN_PACKAGES: &[&str] = &["jgtcore", "jgtpy", "jgtml", "jgtagentic", "jgt_session"];

/// Fixed package name used by [`create_session_tracer`] for cross-package
/// workflow tracing.
const SESSION_PACKAGE: &str = "jgt_session";

const COMPLETION_STEP: &str = "operation_complete";
const ERROR_STEP: &str = "operation_error";

/// Locally recorded observation, kept only for the currently active trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    pub id: String,
    pub name: String,
    pub kind: ObservationKind,
}

/// Per-(package, operation-type) tracing client.
///
/// Not safe for concurrent use from multiple threads: `trace_id`,
/// `session_id`, and the observation list are mutated without
/// synchronization. Use one session per concurrent logical operation.
pub struct TracerSession {
    package_name: String,
    operation_type: String,
    config: TracingConfig,
    sink: Option<Arc<dyn TraceSink>>,
    enabled: bool,
    trace_id: Option<String>,
    session_id: Option<String>,
    observations: Vec<Observation>,
}

impl std::fmt::Debug for TracerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TracerSession")
            .field("package_name", &self.package_name)
            .field("operation_type", &self.operation_type)
            .field("config", &self.config)
            .field("sink", &self.sink.as_ref().map(|_| "dyn TraceSink"))
            .field("enabled", &self.enabled)
            .field("trace_id", &self.trace_id)
            .field("session_id", &self.session_id)
            .field("observations", &self.observations)
            .finish()
    }
}

impl TracerSession {
    /// Create a session, loading configuration from the default locations and
    /// resolving the sink from the resulting credentials.
    ///
    /// # Errors
    ///
    /// Returns [`JgtError::Validation`] when `package_name` or
    /// `operation_type` is empty. This is the loud programmer-error class;
    /// everything operational degrades silently instead.
    pub fn new(package_name: impl Into<String>, operation_type: impl Into<String>) -> Result<Self> {
        let config = resolve_tracing_config();
        let sink = resolve_sink(&config);
        Self::with_sink(package_name, operation_type, config, sink)
    }

    /// Create a session with an explicit configuration and sink.
    ///
    /// Passing `None` for the sink disables tracing, exactly as an
    /// unavailable backend would at runtime.
    pub fn with_sink(
        package_name: impl Into<String>,
        operation_type: impl Into<String>,
        config: TracingConfig,
        sink: Option<Arc<dyn TraceSink>>,
    ) -> Result<Self> {
        let package_name = package_name.into();
        let operation_type = operation_type.into();

        if package_name.is_empty() {
            return Err(JgtError::Validation(
                "package_name must be a non-empty string".to_string(),
            ));
        }
        if operation_type.is_empty() {
            return Err(JgtError::Validation(
                "operation_type must be a non-empty string".to_string(),
            ));
        }

        if !KNOWN_PACKAGES.contains(&package_name.as_str()) {
            warn!(
                package = %package_name,
                known = ?KNOWN_PACKAGES,
                "unknown package name"
            );
        }

        let sink_available = sink.is_some();
        let excluded = config.excluded_packages.contains(&package_name);
        let enabled = config.enabled && sink_available && !excluded;

        if config.enabled && !sink_available {
            info!(package = %package_name, "trace sink unavailable, tracing disabled");
        }
        if excluded {
            debug!(package = %package_name, "package excluded from tracing");
        }

        Ok(Self {
            package_name,
            operation_type,
            config,
            sink,
            enabled,
            trace_id: None,
            session_id: None,
            observations: Vec::new(),
        })
    }

    /// Whether this session will deliver anything to the sink.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn operation_type(&self) -> &str {
        &self.operation_type
    }

    /// Identifier of the active trace, if any. Remains readable after
    /// completion until the next `start_operation` overwrites it.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Observations recorded for the active trace, in call order. Only
    /// backend-acknowledged observations appear here.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn config(&self) -> &TracingConfig {
        &self.config
    }

    /// Execute a sink call through the fail-safe boundary.
    ///
    /// Skipped entirely when disabled; a fault is caught, surfaced as a
    /// warning only when `fail_silent` is off, and reported as `false`.
    fn safe_execute<F>(&self, call: F) -> bool
    where
        F: FnOnce(&dyn TraceSink) -> Result<()>,
    {
        if !self.enabled {
            return false;
        }
        let sink = match self.sink.as_deref() {
            Some(sink) => sink,
            None => return false,
        };
        match call(sink) {
            Ok(()) => true,
            Err(e) => {
                if !self.config.fail_silent {
                    warn!(package = %self.package_name, error = %e, "tracing operation failed");
                }
                false
            }
        }
    }

    /// Start a new operation trace.
    ///
    /// Returns the new trace identifier, or `None` when tracing is disabled.
    /// Any previously active trace is overwritten and its local observation
    /// list discarded; the backend retains the prior trace independently.
    /// The state becomes active regardless of whether the sink call
    /// succeeded; state tracking is local.
    pub fn start_operation(
        &mut self,
        name: &str,
        input_data: Option<Value>,
        metadata: Option<Metadata>,
    ) -> Option<String> {
        if !self.enabled {
            return None;
        }

        if let Some(previous) = &self.trace_id {
            debug!(
                package = %self.package_name,
                abandoned_trace = %previous,
                "starting a new trace over an active one"
            );
        }

        let trace_id = Uuid::new_v4().to_string();
        let session_id = format!(
            "{}_{}",
            self.config.session_prefix,
            chrono::Utc::now().timestamp()
        );

        let mut trace_metadata = Metadata::new();
        trace_metadata.insert("package".to_string(), json!(self.package_name));
        trace_metadata.insert("operation_type".to_string(), json!(self.operation_type));
        trace_metadata.insert("environment".to_string(), json!(self.config.environment));
        trace_metadata.insert("session_id".to_string(), json!(session_id));
        if let Some(overrides) = metadata {
            trace_metadata.extend(overrides);
        }

        let record = TraceRecord {
            trace_id: trace_id.clone(),
            session_id: session_id.clone(),
            name: format!("{}:{}:{}", self.package_name, self.operation_type, name),
            input: input_data,
            metadata: trace_metadata,
        };

        self.trace_id = Some(trace_id.clone());
        self.session_id = Some(session_id);
        self.observations.clear();

        if self.safe_execute(|sink| sink.create_trace(&record)) {
            debug!(package = %self.package_name, trace_id = %trace_id, name, "trace started");
        }

        Some(trace_id)
    }

    /// Add an observation step to the active trace.
    ///
    /// Returns the observation identifier, or `None` when tracing is
    /// disabled or no trace is active. The observation is appended to the
    /// local list only when the sink acknowledged it; call order is
    /// preserved and nothing is batched or reordered here.
    pub fn add_step(
        &mut self,
        step_name: &str,
        input_data: Option<Value>,
        output_data: Option<Value>,
        metadata: Option<Metadata>,
        kind: ObservationKind,
    ) -> Option<String> {
        self.record_step(step_name, input_data, output_data, metadata, kind)
            .map(|(id, _delivered)| id)
    }

    fn record_step(
        &mut self,
        step_name: &str,
        input_data: Option<Value>,
        output_data: Option<Value>,
        metadata: Option<Metadata>,
        kind: ObservationKind,
    ) -> Option<(String, bool)> {
        if !self.enabled {
            return None;
        }
        let trace_id = self.trace_id.clone()?;

        let observation_id = Uuid::new_v4().to_string();

        let mut step_metadata = Metadata::new();
        step_metadata.insert("step_type".to_string(), json!(step_name));
        step_metadata.insert("package".to_string(), json!(self.package_name));
        step_metadata.insert("operation".to_string(), json!(self.operation_type));
        if let Some(overrides) = metadata {
            step_metadata.extend(overrides);
        }

        let record = ObservationRecord {
            observation_id: observation_id.clone(),
            trace_id,
            kind,
            name: format!("{}:{}", self.package_name, step_name),
            input: input_data,
            output: output_data,
            metadata: step_metadata,
        };

        let delivered = self.safe_execute(|sink| sink.create_observation(&record));
        if delivered {
            self.observations.push(Observation {
                id: observation_id.clone(),
                name: step_name.to_string(),
                kind,
            });
        }

        Some((observation_id, delivered))
    }

    /// Complete the active operation by recording a final summary step.
    ///
    /// Returns whether the completion step reached the sink. The trace and
    /// session identifiers stay readable until the next `start_operation`.
    pub fn complete_operation(
        &mut self,
        output_data: Option<Value>,
        metadata: Option<Metadata>,
    ) -> bool {
        if !self.enabled || self.trace_id.is_none() {
            return false;
        }

        let summary = serde_json::to_value(&self.observations).unwrap_or(Value::Null);

        let mut completion_metadata = Metadata::new();
        completion_metadata.insert("operation_completed".to_string(), json!(true));
        completion_metadata.insert(
            "total_observations".to_string(),
            json!(self.observations.len()),
        );
        if let Some(overrides) = metadata {
            completion_metadata.extend(overrides);
        }

        let delivered = self
            .record_step(
                COMPLETION_STEP,
                Some(json!({ "observations_summary": summary })),
                output_data,
                Some(completion_metadata),
                ObservationKind::Event,
            )
            .map(|(_, delivered)| delivered)
            .unwrap_or(false);

        if delivered {
            debug!(
                package = %self.package_name,
                steps = self.observations.len(),
                "trace completed"
            );
        }

        delivered
    }

    /// Run `operation` inside a scoped trace.
    ///
    /// Starts exactly one trace on entry; the closure receives the session
    /// and can read the trace identifier via [`TracerSession::trace_id`]. On
    /// an `Err` outcome one `operation_error` observation is recorded with
    /// the fault's type and message, and the error is returned unchanged.
    /// Completion runs exactly once on every exit path, before control
    /// returns to the caller.
    pub fn trace_operation<T, E, F>(
        &mut self,
        name: &str,
        input_data: Option<Value>,
        metadata: Option<Metadata>,
        operation: F,
    ) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Self) -> std::result::Result<T, E>,
        E: std::fmt::Display,
    {
        self.start_operation(name, input_data, metadata);

        let outcome = operation(self);

        if let Err(e) = &outcome {
            let mut error_metadata = Metadata::new();
            error_metadata.insert("operation_failed".to_string(), json!(true));
            self.add_step(
                ERROR_STEP,
                Some(json!({ "error_type": std::any::type_name::<E>() })),
                Some(json!({ "error_message": e.to_string() })),
                Some(error_metadata),
                ObservationKind::Event,
            );
        }

        let mut completion_metadata = Metadata::new();
        completion_metadata.insert("scoped_operation".to_string(), json!(true));
        self.complete_operation(None, Some(completion_metadata));

        outcome
    }
}

/// Create a session-level tracer for multi-package workflows.
pub fn create_session_tracer(session_name: impl Into<String>) -> Result<TracerSession> {
    TracerSession::new(SESSION_PACKAGE, session_name)
}

/// Build the viewer URL for a trace from the configured base URL.
///
/// Returns `None` when the configuration lacks a base URL or the identifier
/// is empty; never an error.
pub fn get_trace_url(trace_id: &str) -> Option<String> {
    let config = resolve_tracing_config();
    build_trace_url(config.langfuse.trace_url.as_deref(), trace_id)
}

fn build_trace_url(base_url: Option<&str>, trace_id: &str) -> Option<String> {
    let base = base_url?;
    if base.is_empty() || trace_id.is_empty() {
        return None;
    }
    Some(format!("{}/{}", base.trim_end_matches('/'), trace_id))
}

/// Whether tracing is configured on and the sink is reachable from the
/// current configuration. Never raises; any internal fault reads as disabled.
pub fn is_tracing_enabled() -> bool {
    let config = resolve_tracing_config();
    config.enabled && resolve_sink(&config).is_some()
}
