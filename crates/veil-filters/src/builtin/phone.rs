//! Phone detection
//!
//! US formats plus the international prefix form, with the original's
//! digit-count validation and OCR tolerance for the exchange block.

use lazy_static::lazy_static;
use regex::Regex;

use veil_core::{IdentifierType, RedactionPolicy, Span};

use crate::builtin::{digit_count, normalize_ocr_digits, spans_from_regex};
use crate::{DetectionContext, Filter};

lazy_static! {
    static ref PHONE_PATTERNS: Vec<(Regex, f64)> = vec![
        (
            Regex::new(
                r"(?i)(\+?1[-. \t]?)?\(?\d{3}\)?[-. \t]?\d{3}[-. \t]?\d{4}(?:[ \t]*(?:ext\.?|x|extension)[ \t]*\d{1,6})?\b",
            )
            .expect("invalid PHONE us"),
            0.9,
        ),
        (
            Regex::new(r"\+[1-9]\d{0,2}[ \t.-]?\(?\d{1,4}\)?(?:[ \t.-]?\d{2,4}){2,4}\b")
                .expect("invalid PHONE intl"),
            0.85,
        ),
        (
            Regex::new(r"\(?[0-9OoIlSsBb|]{3}\)?[ \t.-][0-9OoIlSsBb|]{3}[ \t.-][0-9OoIlSsBb|]{4}\b")
                .expect("invalid PHONE ocr"),
            0.75,
        ),
    ];
}

fn is_phone_like(candidate: &str) -> bool {
    let digits = digit_count(&normalize_ocr_digits(candidate));
    (10..=15).contains(&digits) || digits == 7
}

pub struct PhoneFilter;

impl PhoneFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PhoneFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for PhoneFilter {
    fn name(&self) -> &'static str {
        "phone"
    }

    fn identifier(&self) -> IdentifierType {
        IdentifierType::Phone
    }

    fn detect(
        &self,
        text: &str,
        _policy: &RedactionPolicy,
        _context: &DetectionContext,
    ) -> anyhow::Result<Vec<Span>> {
        let mut spans = Vec::new();
        for (re, confidence) in PHONE_PATTERNS.iter() {
            let hits =
                spans_from_regex(re, text, None, IdentifierType::Phone, *confidence, "phone");
            spans.extend(hits.into_iter().filter(|s| is_phone_like(&s.text)));
        }
        Ok(spans)
    }
}
