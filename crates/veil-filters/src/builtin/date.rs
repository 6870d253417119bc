//! Date detection
//!
//! Labeled birth dates score highest, then unlabeled numeric and
//! month-name forms.

use lazy_static::lazy_static;
use regex::Regex;

use veil_core::{IdentifierType, RedactionPolicy, Span};

use crate::builtin::spans_from_regex;
use crate::{DetectionContext, Filter};

lazy_static! {
    static ref DOB_RE: Regex = Regex::new(
        r"(?i)\b(?:DOB|D\.O\.B\.?|Date\s+of\s+Birth|Birth\s*date|Born)\s*(?:[:\-]\s*)?(\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4}|\d{4}-\d{2}-\d{2})",
    )
    .expect("invalid DOB_RE");
    static ref DATE_PATTERNS: Vec<(Regex, f64)> = vec![
        (
            Regex::new(r"\b\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4}\b").expect("invalid DATE us"),
            0.95,
        ),
        (
            Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").expect("invalid DATE iso"),
            0.95,
        ),
        (
            Regex::new(
                r"(?i)\b(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|Jun(?:e)?|Jul(?:y)?|Aug(?:ust)?|Sep(?:t(?:ember)?)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)\.?\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4}\b",
            )
            .expect("invalid DATE month name"),
            0.9,
        ),
        (
            Regex::new(
                r"(?i)\b\d{1,2}(?:st|nd|rd|th)?\s+(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|Jun(?:e)?|Jul(?:y)?|Aug(?:ust)?|Sep(?:t(?:ember)?)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)\.?,?\s+\d{4}\b",
            )
            .expect("invalid DATE day first"),
            0.9,
        ),
    ];
}

pub struct DateFilter;

impl DateFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for DateFilter {
    fn name(&self) -> &'static str {
        "date"
    }

    fn identifier(&self) -> IdentifierType {
        IdentifierType::Date
    }

    fn detect(
        &self,
        text: &str,
        _policy: &RedactionPolicy,
        _context: &DetectionContext,
    ) -> anyhow::Result<Vec<Span>> {
        let mut spans =
            spans_from_regex(&DOB_RE, text, Some(1), IdentifierType::Date, 0.97, "date");
        for (re, confidence) in DATE_PATTERNS.iter() {
            spans.extend(spans_from_regex(
                re,
                text,
                None,
                IdentifierType::Date,
                *confidence,
                "date",
            ));
        }
        Ok(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn detect(text: &str) -> Vec<Span> {
        DateFilter::new()
            .detect(
                text,
                &RedactionPolicy::default(),
                &DetectionContext::new(Uuid::new_v4()),
            )
            .unwrap()
    }

    #[test]
    fn test_labeled_dob_outranks_bare_date() {
        let spans = detect("DOB: 03/14/1962");
        let best = spans
            .iter()
            .max_by(|a, b| a.confidence.partial_cmp(&b.confidence).unwrap())
            .unwrap();
        assert_eq!(best.text, "03/14/1962");
        assert!((best.confidence - 0.97).abs() < f64::EPSILON);
    }

    #[test]
    fn test_iso_date() {
        assert!(detect("admitted 2024-11-03").iter().any(|s| s.text == "2024-11-03"));
    }

    #[test]
    fn test_month_name_date() {
        assert!(!detect("seen on March 3rd, 1998").is_empty());
        assert!(!detect("seen on 3 March 1998").is_empty());
    }

    #[test]
    fn test_plain_number_ignored() {
        assert!(detect("dose 325 mg").is_empty());
    }
}
