//! Built-in regex detectors
//!
//! Pattern families are ported from the original scanner, including its
//! tolerance for common OCR confusions (O for 0, l for 1, S for 5). Each
//! detector is deliberately independent: it never coordinates with other
//! filters, and overlap between their outputs is the engine's problem.

pub mod date;
pub mod email;
pub mod ip;
pub mod mrn;
pub mod name;
pub mod phone;
pub mod ssn;
pub mod url;
pub mod zipcode;

use regex::Regex;

use veil_core::{IdentifierType, Span};

/// Collect spans for every match of `re`. When `group` is given, the span
/// covers that capture group instead of the whole match.
pub(crate) fn spans_from_regex(
    re: &Regex,
    text: &str,
    group: Option<usize>,
    identifier: IdentifierType,
    confidence: f64,
    source: &'static str,
) -> Vec<Span> {
    let mut spans = Vec::new();
    for captures in re.captures_iter(text) {
        let matched = match group {
            Some(g) => captures.get(g),
            None => captures.get(0),
        };
        let Some(matched) = matched else { continue };
        if matched.as_str().is_empty() {
            continue;
        }
        spans.push(Span::new(
            identifier,
            matched.start(),
            matched.end(),
            matched.as_str(),
            confidence,
            source,
        ));
    }
    spans
}

/// Map the OCR confusion set onto digits, as the original scanner does
/// before validating digit-shaped identifiers.
pub(crate) fn normalize_ocr_digits(text: &str) -> String {
    text.chars()
        .map(|ch| match ch {
            'O' | 'o' => '0',
            'l' | 'I' | '|' => '1',
            'Z' | 'z' => '2',
            'S' | 's' => '5',
            'b' => '6',
            'B' => '8',
            'g' | 'G' | 'q' => '9',
            other => other,
        })
        .collect()
}

pub(crate) fn digit_count(text: &str) -> usize {
    text.chars().filter(|c| c.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ocr_digits() {
        assert_eq!(normalize_ocr_digits("5S5-O1-lZ34"), "555-01-1234");
    }

    #[test]
    fn test_spans_from_regex_capture_group() {
        let re = Regex::new(r"MRN:\s*(\d+)").unwrap();
        let spans = spans_from_regex(
            &re,
            "MRN: 12345",
            Some(1),
            IdentifierType::Mrn,
            0.9,
            "test",
        );
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "12345");
        assert_eq!(spans[0].start, 5);
    }
}
