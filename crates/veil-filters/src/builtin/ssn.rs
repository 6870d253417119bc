//! SSN detection
//!
//! Dashed, spaced, masked, and bare nine-digit forms, with the original's
//! permissive validation: partially masked values must still be redacted,
//! and OCR-garbled digits are normalized before counting.

use lazy_static::lazy_static;
use regex::Regex;

use veil_core::{IdentifierType, RedactionPolicy, Span};

use crate::builtin::{digit_count, normalize_ocr_digits, spans_from_regex};
use crate::{DetectionContext, Filter};

lazy_static! {
    // (pattern, confidence) pairs, most specific first.
    static ref SSN_PATTERNS: Vec<(Regex, f64)> = vec![
        (
            Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("invalid SSN dashed"),
            0.95,
        ),
        (
            Regex::new(r"\b\d{3}[ \t]\d{2}[ \t]\d{4}\b").expect("invalid SSN spaced"),
            0.9,
        ),
        (
            Regex::new(r"\b\d{3}[.\u{2013}]\d{2}[.\u{2013}]\d{4}\b").expect("invalid SSN dotted"),
            0.9,
        ),
        (
            Regex::new(r"[*Xx]{3}-?[*Xx]{2}-?\d{4}\b").expect("invalid SSN masked"),
            0.9,
        ),
        (
            Regex::new(r"\b\d{3}-\d{2}-[*Xx]{4}").expect("invalid SSN tail masked"),
            0.9,
        ),
        (
            Regex::new(r"\b[0-9BOSZIlGg|o]{3}-[0-9BOSZIlGg|o]{2}-[0-9BOSZIlGg|o]{3,4}\b")
                .expect("invalid SSN ocr"),
            0.85,
        ),
        (
            Regex::new(r"\b\d{9}\b").expect("invalid SSN bare"),
            0.75,
        ),
    ];
}

/// Permissive by design: when a value looks like an SSN, under-redaction is
/// the failure mode to avoid.
fn is_valid_ssn(candidate: &str) -> bool {
    let compact: String = candidate.chars().filter(|c| !c.is_whitespace()).collect();
    let masks = compact
        .chars()
        .filter(|c| matches!(c, '*' | 'X' | 'x'))
        .count();
    if masks >= 2 {
        return digit_count(&compact) >= 3;
    }

    let digits = digit_count(&normalize_ocr_digits(candidate));
    (8..=9).contains(&digits)
}

pub struct SsnFilter;

impl SsnFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SsnFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for SsnFilter {
    fn name(&self) -> &'static str {
        "ssn"
    }

    fn identifier(&self) -> IdentifierType {
        IdentifierType::Ssn
    }

    fn detect(
        &self,
        text: &str,
        _policy: &RedactionPolicy,
        _context: &DetectionContext,
    ) -> anyhow::Result<Vec<Span>> {
        let mut spans = Vec::new();
        for (re, confidence) in SSN_PATTERNS.iter() {
            let hits = spans_from_regex(re, text, None, IdentifierType::Ssn, *confidence, "ssn");
            spans.extend(hits.into_iter().filter(|s| is_valid_ssn(&s.text)));
        }
        Ok(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn detect(text: &str) -> Vec<Span> {
        SsnFilter::new()
            .detect(
                text,
                &RedactionPolicy::default(),
                &DetectionContext::new(Uuid::new_v4()),
            )
            .unwrap()
    }

    #[test]
    fn test_dashed_ssn() {
        let spans = detect("SSN 123-45-6789 on file");
        assert!(spans.iter().any(|s| s.text == "123-45-6789"));
        assert!(spans.iter().all(|s| s.identifier == IdentifierType::Ssn));
    }

    #[test]
    fn test_masked_ssn_is_still_redacted() {
        let spans = detect("last four: ***-**-6789");
        assert!(!spans.is_empty());
    }

    #[test]
    fn test_ocr_garbled_ssn() {
        // 'S' read as 5, 'O' as 0.
        let spans = detect("SSN S23-4S-678O noted");
        assert!(spans.iter().any(|s| s.text.contains("S23")));
    }

    #[test]
    fn test_bare_nine_digits_lower_confidence() {
        let spans = detect("id 123456789 end");
        let bare = spans.iter().find(|s| s.text == "123456789").unwrap();
        assert!(bare.confidence < 0.9);
    }

    #[test]
    fn test_short_number_rejected() {
        assert!(detect("room 1234").is_empty());
    }
}
