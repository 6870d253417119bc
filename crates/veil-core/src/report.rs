//! Execution reports
//!
//! One `FilterReport` per filter invocation, aggregated into one
//! `ExecutionReport` per document. Reports are read-only once produced and
//! never contain matched source text.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::IdentifierType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterReport {
    pub filter: String,
    pub identifier: IdentifierType,
    pub span_count: usize,
    pub execution_ms: u64,
    /// Recorded detector failure. A filter that errors contributes zero
    /// spans and never halts the document.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "detail")]
pub enum DocumentStatus {
    /// Every filter ran to completion.
    FullyProcessed,
    /// Best-effort result; some filters errored or timed out.
    ProcessedWithErrors { errors: usize },
    /// Nothing usable was detected because every filter failed; the
    /// original text was returned. Loud by design, never disguised as
    /// success.
    Failed,
}

impl DocumentStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, DocumentStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub document_id: Uuid,
    pub status: DocumentStatus,
    pub filters_executed: usize,
    pub total_spans_detected: usize,
    pub spans_applied: usize,
    pub total_execution_ms: u64,
    pub per_filter: Vec<FilterReport>,
}

impl ExecutionReport {
    pub fn error_count(&self) -> usize {
        self.per_filter.iter().filter(|f| f.error.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_count() {
        let report = ExecutionReport {
            document_id: Uuid::new_v4(),
            status: DocumentStatus::ProcessedWithErrors { errors: 1 },
            filters_executed: 2,
            total_spans_detected: 3,
            spans_applied: 3,
            total_execution_ms: 12,
            per_filter: vec![
                FilterReport {
                    filter: "ssn".into(),
                    identifier: IdentifierType::Ssn,
                    span_count: 3,
                    execution_ms: 5,
                    error: None,
                },
                FilterReport {
                    filter: "name".into(),
                    identifier: IdentifierType::Name,
                    span_count: 0,
                    execution_ms: 7,
                    error: Some("boom".into()),
                },
            ],
        };
        assert_eq!(report.error_count(), 1);
        assert!(!report.status.is_failed());
    }

    #[test]
    fn test_status_serialization_is_tagged() {
        let json = serde_json::to_string(&DocumentStatus::ProcessedWithErrors { errors: 2 }).unwrap();
        assert!(json.contains("processed_with_errors"));
        let back: DocumentStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DocumentStatus::ProcessedWithErrors { errors: 2 });
    }
}
