//! Scoped tracing walkthrough
//!
//! Shows the scoped form of the tracer: the trace is started on entry and
//! completed on every exit path, including the error path, where the original
//! fault is recorded as an observation and then returned unchanged.
//!
//! # Running the example
//!
//! ```bash
//! cargo run --example scoped_tracing
//! ```

use jgtcore::tracer::{create_session_tracer, ObservationKind, TracerSession};
use jgtcore::JgtError;
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut tracer = TracerSession::new("jgtml", "ml_analysis")?;

    // Normal path: start and completion are handled by the scope.
    let prediction: Result<&str, JgtError> = tracer.trace_operation(
        "feature_engineering",
        Some(json!({"timeframe": "H1"})),
        None,
        |tracer| {
            tracer.add_step(
                "extract_features",
                Some(json!({"raw_data": "1000_bars"})),
                Some(json!({"features": 50})),
                None,
                ObservationKind::Event,
            );
            tracer.add_step(
                "ml_prediction",
                Some(json!({"features": 50})),
                Some(json!({"prediction": "BUY", "confidence": 0.85})),
                None,
                ObservationKind::Generation,
            );
            Ok("BUY")
        },
    );
    println!("Prediction: {:?}", prediction);

    // Error path: the fault is traced and propagated unchanged.
    let failed: Result<(), String> =
        tracer.trace_operation("operation_with_error", None, None, |tracer| {
            tracer.add_step(
                "step_1",
                Some(json!({"input": "data"})),
                Some(json!({"output": "success"})),
                None,
                ObservationKind::Event,
            );
            Err("simulated error for testing".to_string())
        });
    println!("Error caught and traced: {:?}", failed.unwrap_err());

    // Session-level tracer spanning multiple packages.
    let mut session = create_session_tracer("full_trading_workflow")?;
    let _: Result<(), JgtError> = session.trace_operation("trading_session", None, None, |s| {
        s.add_step(
            "data_collection",
            Some(json!({"symbols": ["EURUSD", "GBPUSD"]})),
            Some(json!({"data_quality": "good"})),
            None,
            ObservationKind::Event,
        );
        s.add_step(
            "agent_decision",
            Some(json!({"signals": 5, "risk_level": "medium"})),
            Some(json!({"action": "place_orders", "orders": 2})),
            None,
            ObservationKind::Event,
        );
        Ok(())
    });

    Ok(())
}
