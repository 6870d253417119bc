//! Property tests for the adapter's core correctness contract: the
//! accelerated and reference paths are output-equivalent for any input.

use proptest::prelude::*;

use veil_accel::{AccelFlags, MultiPatternScanner, SpanIndex, SpliceOp, Splicer};

fn small_text() -> impl Strategy<Value = String> {
    // Includes a multibyte char so boundary validation gets exercised.
    proptest::string::string_regex("[abcdEé 0-9,.]{0,120}").unwrap()
}

fn pattern_set() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(
        proptest::string::string_regex("[abcdE]{1,4}").unwrap(),
        1..6,
    )
}

proptest! {
    #[test]
    fn scanner_paths_are_equivalent(text in small_text(), patterns in pattern_set()) {
        let accelerated = MultiPatternScanner::new(patterns.clone(), AccelFlags::default());
        let reference = MultiPatternScanner::new(patterns, AccelFlags::reference_only());
        prop_assert_eq!(accelerated.find_all(&text), reference.find_all(&text));
    }

    #[test]
    fn interval_paths_are_equivalent(
        ranges in proptest::collection::vec((0usize..200, 1usize..40), 0..24),
        query in (0usize..200, 1usize..40),
    ) {
        let ranges: Vec<(usize, usize)> =
            ranges.into_iter().map(|(s, l)| (s, s + l)).collect();
        let accelerated = SpanIndex::build(&ranges, AccelFlags::default());
        let reference = SpanIndex::build(&ranges, AccelFlags::reference_only());
        let (qs, ql) = query;
        prop_assert_eq!(
            accelerated.find_overlapping(qs, qs + ql),
            reference.find_overlapping(qs, qs + ql)
        );
    }

    #[test]
    fn splice_paths_are_equivalent(
        text in small_text(),
        raw_ops in proptest::collection::vec((0usize..140, 0usize..20, "[XY]{1,6}"), 0..10),
    ) {
        let ops: Vec<SpliceOp> = raw_ops
            .into_iter()
            .map(|(start, len, replacement)| SpliceOp {
                start,
                end: start + len,
                replacement,
            })
            .collect();
        let accelerated = Splicer::new(AccelFlags::default()).apply(&text, &ops);
        let reference = Splicer::new(AccelFlags::reference_only()).apply(&text, &ops);
        prop_assert_eq!(accelerated, reference);
    }

    #[test]
    fn splice_is_idempotent_for_a_fixed_op_list(
        text in small_text(),
        raw_ops in proptest::collection::vec((0usize..140, 1usize..20, "[XY]{1,6}"), 0..10),
    ) {
        let ops: Vec<SpliceOp> = raw_ops
            .into_iter()
            .map(|(start, len, replacement)| SpliceOp {
                start,
                end: start + len,
                replacement,
            })
            .collect();
        let splicer = Splicer::default();
        let first = splicer.apply(&text, &ops);
        let second = splicer.apply(&text, &ops);
        prop_assert_eq!(first, second);
    }
}
