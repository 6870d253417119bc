//! Redact a small clinical note and print the result with stage traces.
//!
//! Run with: cargo run -p veil-engine --example redact

use std::sync::Arc;

use veil_accel::AccelFlags;
use veil_consistency::{ConsistencyManager, SessionSalt};
use veil_core::RedactionPolicy;
use veil_engine::{EngineConfig, RedactionEngine};
use veil_filters::FilterRegistry;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let note = "Patient: John Smith, MRN: 00482913, DOB: 03/14/1962.\n\
                SSN 123-45-6789. Call (612) 555-0188 or jane.doe@clinic.example.org.\n\
                John Smith follows up next week.";

    let registry = FilterRegistry::with_defaults(AccelFlags::default());
    let engine = RedactionEngine::new(Arc::new(registry), EngineConfig::default())
        .with_consistency(Arc::new(ConsistencyManager::new(SessionSalt::generate())));

    let outcome = engine.redact(note, &RedactionPolicy::default()).await;

    println!("--- redacted ---\n{}\n", outcome.text);
    println!(
        "status: {:?}, detected: {}, applied: {}, {} ms",
        outcome.report.status,
        outcome.report.total_spans_detected,
        outcome.report.spans_applied,
        outcome.report.total_execution_ms,
    );
}
