//! Filter contract

use uuid::Uuid;

use veil_core::{IdentifierType, RedactionPolicy, Span};

/// Shared read-only context handed to every filter invocation.
#[derive(Debug, Clone)]
pub struct DetectionContext {
    pub document_id: Uuid,
}

impl DetectionContext {
    pub fn new(document_id: Uuid) -> Self {
        Self { document_id }
    }
}

/// Contract every detector implements. Detection is synchronous CPU work;
/// the engine runs each filter on a blocking task under a timeout.
pub trait Filter: Send + Sync {
    /// Stable name, used as the span source tag and in reports.
    fn name(&self) -> &'static str;

    fn identifier(&self) -> IdentifierType;

    /// Static per-type rank; lower wins overlap resolution.
    fn priority(&self) -> u32 {
        self.identifier().default_priority()
    }

    /// Detect occurrences in `text`. Errors are caught by the engine,
    /// recorded in the filter's report, and never halt the document.
    fn detect(
        &self,
        text: &str,
        policy: &RedactionPolicy,
        context: &DetectionContext,
    ) -> anyhow::Result<Vec<Span>>;
}
