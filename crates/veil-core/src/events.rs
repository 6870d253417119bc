//! Tracing hooks
//!
//! Stage-start/stage-end events with span counts and timings, attachable by
//! external diagnostics. Hooks are never required for correctness; the
//! default is a no-op.

use std::time::Duration;

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Scanning,
    Merging,
    Splicing,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Scanning => "scanning",
            Stage::Merging => "merging",
            Stage::Splicing => "splicing",
        }
    }
}

pub trait TraceHook: Send + Sync {
    fn stage_started(&self, _document_id: Uuid, _stage: Stage) {}

    fn stage_finished(
        &self,
        _document_id: Uuid,
        _stage: Stage,
        _span_count: usize,
        _elapsed: Duration,
    ) {
    }
}

/// Default hook: does nothing.
pub struct NoopHook;

impl TraceHook for NoopHook {}
