//! Person name detection
//!
//! The highest-signal families are anchored on context words (titles,
//! chart labels, family relations). A multi-pattern trigger scan decides
//! whether those families run at all, so documents with no context words
//! skip the expensive regexes. Generic capitalized pairs always run but
//! carry low confidence and are pruned against structure vocabulary.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use veil_accel::{AccelFlags, MultiPatternScanner, ScannerCache};
use veil_core::{IdentifierType, RedactionPolicy, Span};

use crate::builtin::spans_from_regex;
use crate::{DetectionContext, Filter};

const TRIGGER_TERMS: &[&str] = &[
    "dr", "mr", "mrs", "ms", "miss", "prof", "rev", "patient", "pt", "subject", "client",
    "mother", "father", "mom", "dad", "sister", "brother", "spouse", "wife", "husband", "son",
    "daughter", "named",
];

// Capitalized words that start sentences or name institutions, not people.
const NAME_STRUCTURE_WORDS: &[&str] = &[
    "the", "and", "for", "with", "this", "that", "hospital", "medical", "center", "clinic",
    "general", "health", "department", "university", "street", "avenue", "north", "south",
    "east", "west", "new", "saint", "county", "memorial", "regional", "emergency", "monday",
    "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "january", "february",
    "march", "april", "june", "july", "august", "september", "october", "november", "december",
];

lazy_static! {
    static ref TITLED_NAME_RE: Regex = Regex::new(
        r"(?i)\b(?:Dr|Mr|Mrs|Ms|Miss|Prof|Rev)\.?\s+([A-Z][A-Za-z'`.-]{1,30}(?:\s+[A-Z][A-Za-z'`.-]{1,30}){0,2})\b",
    )
    .expect("invalid TITLED_NAME_RE");
    static ref PATIENT_NAME_RE: Regex = Regex::new(
        r"(?i)\b(?:Patient|Pt|Subject|Client)\s*[:\t ]+\s*([A-Z][a-z]{2,}(?:[ \t]+[A-Z]\.?)?(?:[ \t]+[A-Z][a-z]{2,}){1,2})\b",
    )
    .expect("invalid PATIENT_NAME_RE");
    static ref FAMILY_MEMBER_RE: Regex = Regex::new(
        r"(?i)\b(?:mother|father|mom|dad|sister|brother|spouse|wife|husband|son|daughter)\s*[:\t -]*([A-Z][a-z]{2,}(?:\s+[A-Z][a-z]{2,}){0,2})\b",
    )
    .expect("invalid FAMILY_MEMBER_RE");
    static ref LAST_FIRST_RE: Regex = Regex::new(
        r"\b([A-Z][A-Za-z'`.-]{1,20}),\s*([A-Z][A-Za-z'`.-]{1,30})(?:\s+[A-Z][A-Za-z'`.-]{1,30})?\b",
    )
    .expect("invalid LAST_FIRST_RE");
    static ref NAME_WITH_SUFFIX_RE: Regex = Regex::new(
        r"\b([A-Z][A-Za-z'`.-]{1,30}(?:\s+[A-Z][A-Za-z'`.-]{1,30}){1,2})(?:,\s*)?(?:Jr|Sr|II|III|IV)\.?\b",
    )
    .expect("invalid NAME_WITH_SUFFIX_RE");
    static ref FIRST_LAST_RE: Regex = Regex::new(
        r"\b([A-Z][a-z]{2,30})(?:\s+[A-Z]\.)?\s+([A-Z][a-z]{2,30})\b",
    )
    .expect("invalid FIRST_LAST_RE");
}

fn is_structure_word(word: &str) -> bool {
    let lower = word.trim_end_matches('.').to_ascii_lowercase();
    NAME_STRUCTURE_WORDS.contains(&lower.as_str())
}

fn looks_like_person(text: &str) -> bool {
    !text.split_whitespace().any(is_structure_word)
}

pub struct NameFilter {
    triggers: Arc<MultiPatternScanner>,
}

impl NameFilter {
    pub fn new(flags: AccelFlags) -> Self {
        Self::with_cache(flags, &ScannerCache::default())
    }

    /// Obtain the trigger scanner through `scanners`, so every filter built
    /// against the same cache reuses one compiled automaton.
    pub fn with_cache(flags: AccelFlags, scanners: &ScannerCache) -> Self {
        let patterns: Vec<String> = TRIGGER_TERMS.iter().map(|t| t.to_string()).collect();
        Self {
            triggers: scanners.get_or_build(&patterns, flags),
        }
    }

    fn has_trigger(&self, text: &str) -> bool {
        !self.triggers.find_all(text).is_empty()
    }
}

impl Filter for NameFilter {
    fn name(&self) -> &'static str {
        "name"
    }

    fn identifier(&self) -> IdentifierType {
        IdentifierType::Name
    }

    fn detect(
        &self,
        text: &str,
        _policy: &RedactionPolicy,
        _context: &DetectionContext,
    ) -> anyhow::Result<Vec<Span>> {
        let mut spans = Vec::new();

        if self.has_trigger(text) {
            spans.extend(spans_from_regex(
                &PATIENT_NAME_RE,
                text,
                Some(1),
                IdentifierType::Name,
                0.95,
                "name",
            ));
            spans.extend(spans_from_regex(
                &TITLED_NAME_RE,
                text,
                Some(1),
                IdentifierType::Name,
                0.92,
                "name",
            ));
            spans.extend(spans_from_regex(
                &FAMILY_MEMBER_RE,
                text,
                Some(1),
                IdentifierType::Name,
                0.85,
                "name",
            ));
        }

        spans.extend(
            spans_from_regex(
                &NAME_WITH_SUFFIX_RE,
                text,
                Some(1),
                IdentifierType::Name,
                0.85,
                "name",
            )
            .into_iter()
            .filter(|s| looks_like_person(&s.text)),
        );
        spans.extend(
            spans_from_regex(&LAST_FIRST_RE, text, None, IdentifierType::Name, 0.8, "name")
                .into_iter()
                .filter(|s| looks_like_person(&s.text)),
        );
        spans.extend(
            spans_from_regex(&FIRST_LAST_RE, text, None, IdentifierType::Name, 0.7, "name")
                .into_iter()
                .filter(|s| looks_like_person(&s.text)),
        );

        Ok(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn filter() -> NameFilter {
        NameFilter::new(AccelFlags::default())
    }

    fn detect(text: &str) -> Vec<Span> {
        filter()
            .detect(
                text,
                &RedactionPolicy::default(),
                &DetectionContext::new(Uuid::new_v4()),
            )
            .unwrap()
    }

    #[test]
    fn test_patient_label_high_confidence() {
        let spans = detect("Patient: John Smith presented with chest pain");
        let best = spans
            .iter()
            .max_by(|a, b| a.confidence.partial_cmp(&b.confidence).unwrap())
            .unwrap();
        assert_eq!(best.text, "John Smith");
        assert!((best.confidence - 0.95).abs() < f64::EPSILON);
    }

    #[test]
    fn test_titled_name() {
        assert!(detect("seen by Dr. Elena Vasquez today")
            .iter()
            .any(|s| s.text == "Elena Vasquez"));
    }

    #[test]
    fn test_family_member() {
        assert!(detect("mother: Carol Jenkins at bedside")
            .iter()
            .any(|s| s.text == "Carol Jenkins"));
    }

    #[test]
    fn test_last_comma_first() {
        assert!(detect("chart for Smith, John D")
            .iter()
            .any(|s| s.text.starts_with("Smith, John")));
    }

    #[test]
    fn test_generic_pair_low_confidence() {
        let spans = detect("met with Maria Gonzalez about billing");
        let hit = spans.iter().find(|s| s.text == "Maria Gonzalez").unwrap();
        assert!((hit.confidence - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_structure_words_excluded() {
        assert!(detect("transferred to Memorial Hospital overnight").is_empty());
    }

    #[test]
    fn test_trigger_scanner_is_shared_through_the_cache() {
        let cache = ScannerCache::default();
        let _a = NameFilter::with_cache(AccelFlags::default(), &cache);
        let _b = NameFilter::with_cache(AccelFlags::default(), &cache);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_trigger_gating() {
        // No trigger words at all, so labeled families never run.
        let spans = detect("Riverside Park reopens in April");
        assert!(spans.iter().all(|s| s.confidence <= 0.85));
    }
}
