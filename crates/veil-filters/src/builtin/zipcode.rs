//! ZIP code detection
//!
//! ZIP+4 is distinctive; a bare five-digit group is only taken when a
//! location cue sits nearby, otherwise it collides with quantities.

use lazy_static::lazy_static;
use regex::Regex;

use veil_core::{IdentifierType, RedactionPolicy, Span};

use crate::builtin::spans_from_regex;
use crate::{DetectionContext, Filter};

lazy_static! {
    static ref ZIP_PLUS4_RE: Regex =
        Regex::new(r"\b\d{5}-\d{4}\b").expect("invalid ZIP_PLUS4_RE");
    static ref ZIP_WITH_STATE_RE: Regex =
        Regex::new(r"\b[A-Z]{2}[ \t]+(\d{5})\b").expect("invalid ZIP_WITH_STATE_RE");
    static ref ZIP_LABELED_RE: Regex =
        Regex::new(r"(?i)\b(?:zip(?:\s*code)?)\s*(?:[:#]\s*)?(\d{5})\b")
            .expect("invalid ZIP_LABELED_RE");
}

pub struct ZipCodeFilter;

impl ZipCodeFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ZipCodeFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for ZipCodeFilter {
    fn name(&self) -> &'static str {
        "zipcode"
    }

    fn identifier(&self) -> IdentifierType {
        IdentifierType::ZipCode
    }

    fn detect(
        &self,
        text: &str,
        _policy: &RedactionPolicy,
        _context: &DetectionContext,
    ) -> anyhow::Result<Vec<Span>> {
        let mut spans = spans_from_regex(
            &ZIP_PLUS4_RE,
            text,
            None,
            IdentifierType::ZipCode,
            0.85,
            "zipcode",
        );
        spans.extend(spans_from_regex(
            &ZIP_WITH_STATE_RE,
            text,
            Some(1),
            IdentifierType::ZipCode,
            0.8,
            "zipcode",
        ));
        spans.extend(spans_from_regex(
            &ZIP_LABELED_RE,
            text,
            Some(1),
            IdentifierType::ZipCode,
            0.8,
            "zipcode",
        ));
        Ok(spans)
    }
}
