//! Basic operation tracing walkthrough
//!
//! Builds a tracer for a data-processing operation, records a few steps, and
//! completes the trace. Without Langfuse credentials in the environment or
//! configuration file the calls degrade to no-ops, so the example is safe to
//! run anywhere.
//!
//! # Running the example
//!
//! ```bash
//! cargo run --example basic_tracing
//! ```

use jgtcore::config::setup_environment;
use jgtcore::tracer::{get_trace_url, is_tracing_enabled, ObservationKind, TracerSession};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    setup_environment();

    println!("Tracing enabled: {}", is_tracing_enabled());

    let mut tracer = TracerSession::new("jgtpy", "data_processing")?;

    let trace_id = tracer.start_operation(
        "process_market_data",
        Some(json!({"symbol": "EURUSD"})),
        None,
    );

    tracer.add_step(
        "load_data",
        Some(json!({"source": "broker"})),
        Some(json!({"records": 1000})),
        None,
        ObservationKind::Event,
    );
    tracer.add_step(
        "calculate_indicators",
        Some(json!({"indicators": ["MA", "RSI"]})),
        Some(json!({"success": true})),
        None,
        ObservationKind::Event,
    );
    tracer.add_step(
        "detect_signals",
        Some(json!({"pattern": "FDB"})),
        Some(json!({"signals_found": 3})),
        None,
        ObservationKind::Event,
    );

    let completed = tracer.complete_operation(Some(json!({"total_signals": 3})), None);

    println!("Recorded {} observations", tracer.observations().len());
    println!("Completion delivered: {}", completed);

    if let Some(trace_id) = trace_id {
        match get_trace_url(&trace_id) {
            Some(url) => println!("View trace: {}", url),
            None => println!("No trace viewer configured"),
        }
    }

    Ok(())
}
