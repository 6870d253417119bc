//! Medical record number detection
//!
//! MRNs are always labeled; the label families come from the original
//! scanner (MRN, chart, record, patient id, accession, case).

use lazy_static::lazy_static;
use regex::Regex;

use veil_core::{IdentifierType, RedactionPolicy, Span};

use crate::builtin::spans_from_regex;
use crate::{DetectionContext, Filter};

lazy_static! {
    static ref MRN_PATTERNS: Vec<Regex> = vec![
        Regex::new(
            r"(?i)\b(?:MRN?|Medical\s+Record(?:\s+Number)?)\s*(?:[:#]\s*)?#?\s*([A-Z0-9][A-Z0-9-]{4,14})\b",
        )
        .expect("invalid MRN labeled"),
        Regex::new(r"(?i)\b(?:Chart|Record|Case|Accession)(?:\s+(?:Number|No|#))?\s*(?:[:#]\s*)?#?\s*([A-Z0-9][A-Z0-9-]{4,11})\b")
            .expect("invalid MRN chart"),
        Regex::new(r"(?i)\b(?:Patient)(?:\s+(?:ID|Number|#))\s*(?:[:#]\s*)?#?\s*([A-Z0-9][A-Z0-9-]{4,14})\b")
            .expect("invalid MRN patient id"),
        Regex::new(r"(?i)\b((?:PAT|PT|MRN|PATIENT|MR|REC|CHART|CASE|ACC)_[A-Z0-9_]{4,20})\b")
            .expect("invalid MRN underscore"),
    ];
}

/// Values already holding a replacement token are left alone.
fn is_tokenized(text: &str) -> bool {
    text.contains("{{") || text.contains("}}") || text.contains('[')
}

pub struct MrnFilter;

impl MrnFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MrnFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for MrnFilter {
    fn name(&self) -> &'static str {
        "mrn"
    }

    fn identifier(&self) -> IdentifierType {
        IdentifierType::Mrn
    }

    fn detect(
        &self,
        text: &str,
        _policy: &RedactionPolicy,
        _context: &DetectionContext,
    ) -> anyhow::Result<Vec<Span>> {
        let mut spans = Vec::new();
        for re in MRN_PATTERNS.iter() {
            let hits = spans_from_regex(re, text, Some(1), IdentifierType::Mrn, 0.92, "mrn");
            spans.extend(hits.into_iter().filter(|s| !is_tokenized(&s.text)));
        }
        Ok(spans)
    }
}
