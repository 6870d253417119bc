//! Deterministic overlap resolution
//!
//! Candidate spans from independent filters routinely overlap (a bare
//! nine-digit match inside a dashed SSN, a name inside a titled name).
//! Resolution is a greedy sweep over a strict total order, so the winner
//! set is a pure function of the candidate set: input order never matters,
//! and equal inputs always produce equal outputs.
//!
//! The order is: priority ascending, confidence descending, length
//! descending, registration index ascending, then start, end, and
//! identifier tag. Same-range same-type copies are collapsed first, so the
//! chain never ends in a tie.
//!
//! Losers are marked ignored and stay in the result for auditing; each
//! winner records the ids of the spans it displaced in `ambiguous_with`.

use std::cmp::Ordering;

use veil_accel::{AccelFlags, SpanIndex};
use veil_core::Span;

/// Drop exact duplicates: same range, same identifier. The highest
/// confidence copy survives; registration order breaks confidence ties.
fn dedup(mut spans: Vec<Span>, registration_index: &dyn Fn(&str) -> usize) -> Vec<Span> {
    spans.sort_by(|a, b| {
        (a.start, a.end, a.identifier)
            .cmp(&(b.start, b.end, b.identifier))
            .then_with(|| {
                b.confidence
                    .partial_cmp(&a.confidence)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| registration_index(&a.source).cmp(&registration_index(&b.source)))
            .then_with(|| a.id.cmp(&b.id))
    });
    spans.dedup_by(|next, kept| {
        next.start == kept.start && next.end == kept.end && next.identifier == kept.identifier
    });
    spans
}

fn rank(a: &Span, b: &Span, registration_index: &dyn Fn(&str) -> usize) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| b.len().cmp(&a.len()))
        .then_with(|| registration_index(&a.source).cmp(&registration_index(&b.source)))
        .then_with(|| a.start.cmp(&b.start))
        .then_with(|| a.end.cmp(&b.end))
        .then_with(|| a.identifier.tag().cmp(b.identifier.tag()))
}

/// Diagnostic composite recorded on spans that took part in an overlap.
/// Reports only; resolution never reads it.
fn disambiguation_score(span: &Span) -> f64 {
    let length_norm = (span.len().min(40)) as f64 / 40.0;
    let priority_weight = 1.0 / (span.priority as f64 + 1.0);
    span.confidence * 0.5 + length_norm * 0.3 + priority_weight * 0.2
}

/// Resolve overlaps among `spans`. Returns every span, winners untouched
/// and losers marked ignored, sorted by position.
pub fn resolve_overlaps(
    spans: Vec<Span>,
    flags: AccelFlags,
    registration_index: &dyn Fn(&str) -> usize,
) -> Vec<Span> {
    let mut candidates = dedup(spans, registration_index);
    if candidates.len() <= 1 {
        candidates.sort_by_key(|s| (s.start, s.end));
        return candidates;
    }

    let ranges: Vec<(usize, usize)> = candidates.iter().map(|s| (s.start, s.end)).collect();
    let index = SpanIndex::build(&ranges, flags);

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| rank(&candidates[a], &candidates[b], registration_index));

    let mut accepted = vec![false; candidates.len()];
    for i in order {
        let overlapping: Vec<usize> = index
            .find_overlapping(candidates[i].start, candidates[i].end)
            .into_iter()
            .filter(|&j| j != i)
            .collect();

        if overlapping.iter().any(|&j| accepted[j]) {
            let loser_id = candidates[i].id;
            candidates[i].mark_ignored();
            for &j in overlapping.iter().filter(|&&j| accepted[j]) {
                candidates[j].ambiguous_with.push(loser_id);
            }
            let score = disambiguation_score(&candidates[i]);
            candidates[i].disambiguation_score = Some(score);
        } else {
            accepted[i] = true;
            if !overlapping.is_empty() {
                let score = disambiguation_score(&candidates[i]);
                candidates[i].disambiguation_score = Some(score);
            }
        }
    }

    candidates.sort_by_key(|s| (s.start, s.end));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_core::IdentifierType;

    fn reg(source: &str) -> usize {
        match source {
            "ssn" => 0,
            "mrn" => 1,
            "name" => 8,
            _ => 99,
        }
    }

    fn span(
        identifier: IdentifierType,
        start: usize,
        end: usize,
        confidence: f64,
        source: &str,
    ) -> Span {
        Span::new(identifier, start, end, "x".repeat(end - start), confidence, source)
    }

    fn winners(spans: &[Span]) -> Vec<&Span> {
        spans.iter().filter(|s| !s.ignored).collect()
    }

    #[test]
    fn test_priority_beats_confidence() {
        // SSN priority 1 with lower confidence still beats name priority 5.
        let spans = vec![
            span(IdentifierType::Name, 0, 11, 0.99, "name"),
            span(IdentifierType::Ssn, 0, 11, 0.75, "ssn"),
        ];
        let resolved = resolve_overlaps(spans, AccelFlags::default(), &reg);
        let w = winners(&resolved);
        assert_eq!(w.len(), 1);
        assert_eq!(w[0].identifier, IdentifierType::Ssn);
    }

    #[test]
    fn test_confidence_breaks_equal_priority() {
        let spans = vec![
            span(IdentifierType::Phone, 0, 12, 0.6, "phone"),
            span(IdentifierType::Ip, 2, 14, 0.9, "ip"),
        ];
        let resolved = resolve_overlaps(spans, AccelFlags::default(), &reg);
        let w = winners(&resolved);
        assert_eq!(w.len(), 1);
        assert_eq!(w[0].identifier, IdentifierType::Ip);
    }

    #[test]
    fn test_loser_recorded_on_winner() {
        let spans = vec![
            span(IdentifierType::Ssn, 0, 11, 0.95, "ssn"),
            span(IdentifierType::Name, 3, 9, 0.9, "name"),
        ];
        let resolved = resolve_overlaps(spans, AccelFlags::default(), &reg);
        let winner = resolved.iter().find(|s| !s.ignored).unwrap();
        let loser = resolved.iter().find(|s| s.ignored).unwrap();
        assert!(winner.ambiguous_with.contains(&loser.id));
        assert!(loser.disambiguation_score.is_some());
    }

    #[test]
    fn test_exact_duplicates_keep_highest_confidence() {
        let a = span(IdentifierType::Ssn, 4, 15, 0.75, "ssn");
        let b = span(IdentifierType::Ssn, 4, 15, 0.95, "ssn");
        let resolved = resolve_overlaps(vec![a, b], AccelFlags::default(), &reg);
        assert_eq!(resolved.len(), 1);
        assert!((resolved[0].confidence - 0.95).abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_overlapping_all_win() {
        let spans = vec![
            span(IdentifierType::Ssn, 0, 5, 0.9, "ssn"),
            span(IdentifierType::Name, 5, 10, 0.9, "name"),
            span(IdentifierType::Mrn, 20, 30, 0.9, "mrn"),
        ];
        let resolved = resolve_overlaps(spans, AccelFlags::default(), &reg);
        assert_eq!(winners(&resolved).len(), 3);
    }

    #[test]
    fn test_input_order_never_matters() {
        let make = || {
            vec![
                span(IdentifierType::Name, 0, 10, 0.7, "name"),
                span(IdentifierType::Ssn, 4, 15, 0.95, "ssn"),
                span(IdentifierType::Mrn, 12, 20, 0.92, "mrn"),
            ]
        };
        let forward = resolve_overlaps(make(), AccelFlags::default(), &reg);
        let mut shuffled = make();
        shuffled.reverse();
        let backward = resolve_overlaps(shuffled, AccelFlags::default(), &reg);

        let key = |spans: &[Span]| -> Vec<(usize, usize, bool)> {
            spans.iter().map(|s| (s.start, s.end, s.ignored)).collect()
        };
        assert_eq!(key(&forward), key(&backward));
    }

    #[test]
    fn test_identifier_tag_breaks_final_ties() {
        // Same priority, confidence, range, and registration index: the
        // lexicographically smaller tag wins, in either input order.
        let flat = |_: &str| 0usize;
        let make = |reversed: bool| {
            let mut spans = vec![
                span(IdentifierType::Ssn, 0, 9, 0.9, "ssn"),
                span(IdentifierType::Mrn, 0, 9, 0.9, "mrn"),
            ];
            if reversed {
                spans.reverse();
            }
            spans
        };
        let winner_of = |spans: Vec<Span>| {
            resolve_overlaps(spans, AccelFlags::default(), &flat)
                .into_iter()
                .find(|s| !s.ignored)
                .map(|s| s.identifier)
        };
        assert_eq!(winner_of(make(false)), Some(IdentifierType::Mrn));
        assert_eq!(winner_of(make(true)), Some(IdentifierType::Mrn));
    }

    #[test]
    fn test_winners_never_overlap() {
        let spans = vec![
            span(IdentifierType::Name, 0, 8, 0.8, "name"),
            span(IdentifierType::Name, 4, 12, 0.8, "name"),
            span(IdentifierType::Name, 10, 18, 0.8, "name"),
            span(IdentifierType::Ssn, 6, 14, 0.9, "ssn"),
        ];
        let resolved = resolve_overlaps(spans, AccelFlags::default(), &reg);
        let w = winners(&resolved);
        for (i, a) in w.iter().enumerate() {
            for b in &w[i + 1..] {
                assert!(!a.overlaps(b), "{}..{} overlaps {}..{}", a.start, a.end, b.start, b.end);
            }
        }
    }
}
