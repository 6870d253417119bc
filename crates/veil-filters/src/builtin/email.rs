//! Email detection

use lazy_static::lazy_static;
use regex::Regex;

use veil_core::{IdentifierType, RedactionPolicy, Span};

use crate::builtin::spans_from_regex;
use crate::{DetectionContext, Filter};

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b").expect("invalid EMAIL_RE");
}

pub struct EmailFilter;

impl EmailFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EmailFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for EmailFilter {
    fn name(&self) -> &'static str {
        "email"
    }

    fn identifier(&self) -> IdentifierType {
        IdentifierType::Email
    }

    fn detect(
        &self,
        text: &str,
        _policy: &RedactionPolicy,
        _context: &DetectionContext,
    ) -> anyhow::Result<Vec<Span>> {
        Ok(spans_from_regex(
            &EMAIL_RE,
            text,
            None,
            IdentifierType::Email,
            0.95,
            "email",
        ))
    }
}
