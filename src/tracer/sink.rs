//! Trace sink boundary and the Langfuse HTTP adapter
//!
//! The sink is the only contact point between the tracer and the external
//! observability backend. It is resolved once at session construction; when
//! credentials are missing the resolver returns `None` and tracing degrades
//! to no-ops, an expected runtime condition rather than an error.

use crate::config::TracingConfig;
use crate::error::{JgtError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Free-form metadata attached to traces and observations.
pub type Metadata = HashMap<String, Value>;

/// Kind of observation recorded within a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObservationKind {
    Event,
    Span,
    Generation,
}

impl std::fmt::Display for ObservationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObservationKind::Event => write!(f, "EVENT"),
            ObservationKind::Span => write!(f, "SPAN"),
            ObservationKind::Generation => write!(f, "GENERATION"),
        }
    }
}

/// Payload for the sink's trace-creation call.
#[derive(Debug, Clone, Serialize)]
pub struct TraceRecord {
    pub trace_id: String,
    pub session_id: String,
    pub name: String,
    pub input: Option<Value>,
    pub metadata: Metadata,
}

/// Payload for the sink's observation call.
#[derive(Debug, Clone, Serialize)]
pub struct ObservationRecord {
    pub observation_id: String,
    pub trace_id: String,
    pub kind: ObservationKind,
    pub name: String,
    pub input: Option<Value>,
    pub output: Option<Value>,
    pub metadata: Metadata,
}

/// Boundary to the external trace backend.
///
/// Implementations perform synchronous, best-effort delivery. Callers never
/// invoke a sink directly; every call goes through the session's fail-safe
/// wrapper, so an `Err` here degrades to a no-op upstream.
pub trait TraceSink: Send + Sync {
    /// Record the start of a trace.
    fn create_trace(&self, trace: &TraceRecord) -> Result<()>;

    /// Record a single observation within a trace.
    fn create_observation(&self, observation: &ObservationRecord) -> Result<()>;

    /// Record several observations at once. The default implementation
    /// delivers them one at a time, in order.
    fn create_observations_batch(&self, observations: &[ObservationRecord]) -> Result<()> {
        for observation in observations {
            self.create_observation(observation)?;
        }
        Ok(())
    }
}

/// Langfuse-backed sink using the public ingestion endpoint.
pub struct LangfuseSink {
    client: reqwest::blocking::Client,
    host: String,
    public_key: String,
    secret_key: String,
    batch_size: usize,
}

impl LangfuseSink {
    /// Build a sink from resolved tracing configuration.
    ///
    /// Returns `None` when the host or either credential is missing, or when
    /// a credential still contains an unresolved `${...}` placeholder.
    pub fn from_config(config: &TracingConfig) -> Option<Self> {
        let host = usable(config.langfuse.host.as_deref())?;
        let public_key = usable(config.langfuse.public_key.as_deref())?;
        let secret_key = usable(config.langfuse.secret_key.as_deref())?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .ok()?;

        Some(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            public_key: public_key.to_string(),
            secret_key: secret_key.to_string(),
            batch_size: config.batch_size.max(1) as usize,
        })
    }

    fn ingest(&self, events: Vec<Value>) -> Result<()> {
        let count = events.len();
        let response = self
            .client
            .post(format!("{}/api/public/ingestion", self.host))
            .basic_auth(&self.public_key, Some(&self.secret_key))
            .json(&serde_json::json!({ "batch": events }))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(JgtError::SinkError(format!(
                "ingestion returned status {}",
                status
            )));
        }

        debug!(count, "delivered ingestion batch");
        Ok(())
    }

    fn trace_event(trace: &TraceRecord) -> Value {
        serde_json::json!({
            "id": uuid::Uuid::new_v4().to_string(),
            "type": "trace-create",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "body": {
                "id": trace.trace_id,
                "sessionId": trace.session_id,
                "name": trace.name,
                "input": trace.input,
                "metadata": trace.metadata,
            }
        })
    }

    fn observation_event(observation: &ObservationRecord) -> Value {
        serde_json::json!({
            "id": uuid::Uuid::new_v4().to_string(),
            "type": "observation-create",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "body": {
                "id": observation.observation_id,
                "traceId": observation.trace_id,
                "type": observation.kind.to_string(),
                "name": observation.name,
                "input": observation.input,
                "output": observation.output,
                "metadata": observation.metadata,
            }
        })
    }
}

impl TraceSink for LangfuseSink {
    fn create_trace(&self, trace: &TraceRecord) -> Result<()> {
        self.ingest(vec![Self::trace_event(trace)])
    }

    fn create_observation(&self, observation: &ObservationRecord) -> Result<()> {
        self.ingest(vec![Self::observation_event(observation)])
    }

    fn create_observations_batch(&self, observations: &[ObservationRecord]) -> Result<()> {
        for chunk in observations.chunks(self.batch_size) {
            self.ingest(chunk.iter().map(Self::observation_event).collect())?;
        }
        Ok(())
    }
}

/// Resolve the trace sink from configuration.
///
/// `None` means the backend is unavailable (missing credentials or host);
/// the session treats that as tracing disabled, never as an error.
pub fn resolve_sink(config: &TracingConfig) -> Option<Arc<dyn TraceSink>> {
    match LangfuseSink::from_config(config) {
        Some(sink) => Some(Arc::new(sink)),
        None => {
            info!("Langfuse sink unavailable, tracing disabled");
            None
        }
    }
}

fn usable(value: Option<&str>) -> Option<&str> {
    match value {
        Some(v) if !v.is_empty() && !v.contains("${") => Some(v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LangfuseConfig;

    fn config_with(langfuse: LangfuseConfig) -> TracingConfig {
        TracingConfig {
            langfuse,
            ..TracingConfig::default()
        }
    }

    fn full_credentials(host: &str) -> LangfuseConfig {
        LangfuseConfig {
            secret_key: Some("sk-test".to_string()),
            public_key: Some("pk-test".to_string()),
            host: Some(host.to_string()),
            trace_url: None,
        }
    }

    #[test]
    fn test_sink_unavailable_without_credentials() {
        let config = config_with(LangfuseConfig::default());
        assert!(resolve_sink(&config).is_none());
    }

    #[test]
    fn test_sink_unavailable_with_unresolved_placeholder() {
        let config = config_with(LangfuseConfig {
            secret_key: Some("${LANGFUSE_SECRET_KEY}".to_string()),
            public_key: Some("pk-test".to_string()),
            host: Some("https://cloud.langfuse.com".to_string()),
            trace_url: None,
        });
        assert!(resolve_sink(&config).is_none());
    }

    #[test]
    fn test_sink_available_with_full_credentials() {
        let config = config_with(full_credentials("https://cloud.langfuse.com"));
        assert!(resolve_sink(&config).is_some());
    }

    #[test]
    fn test_observation_kind_display() {
        assert_eq!(ObservationKind::Event.to_string(), "EVENT");
        assert_eq!(ObservationKind::Span.to_string(), "SPAN");
        assert_eq!(ObservationKind::Generation.to_string(), "GENERATION");
    }

    #[test]
    fn test_create_trace_posts_ingestion_batch() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/public/ingestion")
            .match_header("authorization", mockito::Matcher::Any)
            .with_status(207)
            .with_body(r#"{"successes":[],"errors":[]}"#)
            .create();

        let config = config_with(full_credentials(&server.url()));
        let sink = LangfuseSink::from_config(&config).unwrap();

        let trace = TraceRecord {
            trace_id: "trace-1".to_string(),
            session_id: "jgt_session_1".to_string(),
            name: "jgtpy:data_processing:refresh".to_string(),
            input: Some(serde_json::json!({"symbol": "EURUSD"})),
            metadata: Metadata::new(),
        };

        sink.create_trace(&trace).unwrap();
        mock.assert();
    }

    #[test]
    fn test_failed_ingestion_is_an_error() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/public/ingestion")
            .with_status(401)
            .create();

        let config = config_with(full_credentials(&server.url()));
        let sink = LangfuseSink::from_config(&config).unwrap();

        let observation = ObservationRecord {
            observation_id: "obs-1".to_string(),
            trace_id: "trace-1".to_string(),
            kind: ObservationKind::Event,
            name: "jgtpy:load_data".to_string(),
            input: None,
            output: None,
            metadata: Metadata::new(),
        };

        let err = sink.create_observation(&observation).unwrap_err();
        assert!(matches!(err, JgtError::SinkError(_)));
    }

    #[test]
    fn test_batch_respects_configured_chunk_size() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/public/ingestion")
            .with_status(207)
            .with_body(r#"{"successes":[],"errors":[]}"#)
            .expect(2)
            .create();

        let config = TracingConfig {
            batch_size: 2,
            langfuse: full_credentials(&server.url()),
            ..TracingConfig::default()
        };
        let sink = LangfuseSink::from_config(&config).unwrap();

        let observations: Vec<ObservationRecord> = (0..3)
            .map(|i| ObservationRecord {
                observation_id: format!("obs-{}", i),
                trace_id: "trace-1".to_string(),
                kind: ObservationKind::Event,
                name: format!("step_{}", i),
                input: None,
                output: None,
                metadata: Metadata::new(),
            })
            .collect();

        sink.create_observations_batch(&observations).unwrap();
        mock.assert();
    }
}
