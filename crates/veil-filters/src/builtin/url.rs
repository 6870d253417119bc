//! URL detection

use lazy_static::lazy_static;
use regex::Regex;

use veil_core::{IdentifierType, RedactionPolicy, Span};

use crate::builtin::spans_from_regex;
use crate::{DetectionContext, Filter};

lazy_static! {
    static ref URL_RE: Regex = Regex::new(
        r#"(?i)\bhttps?://[A-Z0-9.-]+\.[A-Z]{2,}(?::\d{1,5})?(?:/[^\s<>"']*)?"#,
    )
    .expect("invalid URL_RE");
    // Bare portal hostnames show up in discharge paperwork without a scheme.
    static ref PORTAL_RE: Regex = Regex::new(
        r#"(?i)\b(?:www\.|portal\.|my\.|mychart\.)[A-Z0-9.-]+\.[A-Z]{2,}(?:/[^\s<>"']*)?"#,
    )
    .expect("invalid PORTAL_RE");
}

pub struct UrlFilter;

impl UrlFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UrlFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for UrlFilter {
    fn name(&self) -> &'static str {
        "url"
    }

    fn identifier(&self) -> IdentifierType {
        IdentifierType::Url
    }

    fn detect(
        &self,
        text: &str,
        _policy: &RedactionPolicy,
        _context: &DetectionContext,
    ) -> anyhow::Result<Vec<Span>> {
        let mut spans = spans_from_regex(&URL_RE, text, None, IdentifierType::Url, 0.95, "url");
        let portal_spans: Vec<Span> =
            spans_from_regex(&PORTAL_RE, text, None, IdentifierType::Url, 0.85, "url")
                .into_iter()
                // The scheme pattern already covers hostnames inside full URLs.
                .filter(|s| !spans_overlap_any(s, &spans))
                .collect();
        spans.extend(portal_spans);
        Ok(spans)
    }
}

fn spans_overlap_any(candidate: &Span, existing: &[Span]) -> bool {
    existing.iter().any(|s| s.overlaps(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn detect(text: &str) -> Vec<Span> {
        UrlFilter::new()
            .detect(
                text,
                &RedactionPolicy::default(),
                &DetectionContext::new(Uuid::new_v4()),
            )
            .unwrap()
    }

    #[test]
    fn test_full_url() {
        let spans = detect("results at https://results.lab.example.com/r/8812 today");
        assert_eq!(spans[0].text, "https://results.lab.example.com/r/8812");
    }

    #[test]
    fn test_portal_without_scheme() {
        let spans = detect("log in at mychart.clinic.example.org to view");
        assert_eq!(spans.len(), 1);
        assert!((spans[0].confidence - 0.85).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_double_count_inside_full_url() {
        let spans = detect("see https://www.clinic.example.org/visit");
        assert_eq!(spans.len(), 1);
    }
}
