//! Parallel redaction engine
//!
//! Orchestrates the three-stage pipeline over one document: scanning runs
//! every registered filter concurrently against the immutable source text,
//! merging resolves overlapping detections deterministically, and splicing
//! rewrites the text with replacement tokens. Batch processing fans the
//! same pipeline out over many documents under a concurrency bound.

pub mod batch;
pub mod engine;
pub mod merge;

pub use batch::{BatchConfig, BatchItemResult, BatchProcessor, BatchProgress, BatchReport};
pub use engine::{EngineConfig, RedactionEngine, RedactionOutcome};
pub use merge::resolve_overlaps;
