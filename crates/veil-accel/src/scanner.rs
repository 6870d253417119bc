//! Multi-pattern literal scanning
//!
//! Matching contract for both paths: every occurrence of every pattern,
//! overlapping occurrences included, ASCII-case-insensitive, reported as
//! byte offsets and sorted by (start, end, pattern index). Patterns are
//! plain literals; empty patterns are discarded at construction.

use crate::{AccelFlags, ExecutionPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternMatch {
    /// Index into the scanner's retained pattern list (`patterns()`).
    pub pattern: usize,
    pub start: usize,
    pub end: usize,
}

pub struct MultiPatternScanner {
    patterns: Vec<String>,
    #[cfg(feature = "accel")]
    automaton: Option<aho_corasick::AhoCorasick>,
    flags: AccelFlags,
}

impl MultiPatternScanner {
    pub fn new(patterns: Vec<String>, flags: AccelFlags) -> Self {
        let patterns: Vec<String> = patterns.into_iter().filter(|p| !p.is_empty()).collect();

        #[cfg(feature = "accel")]
        let automaton = if flags.scan_accelerated() {
            match aho_corasick::AhoCorasick::builder()
                .ascii_case_insensitive(true)
                .match_kind(aho_corasick::MatchKind::Standard)
                .build(&patterns)
            {
                Ok(ac) => Some(ac),
                Err(err) => {
                    // Build failure degrades this scanner to the reference
                    // path; it is logged, never raised.
                    tracing::warn!(%err, "automaton build failed, scanner degraded to reference path");
                    None
                }
            }
        } else {
            None
        };

        Self {
            patterns,
            #[cfg(feature = "accel")]
            automaton,
            flags,
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn flags(&self) -> AccelFlags {
        self.flags
    }

    /// Which path `find_all` will take.
    pub fn path(&self) -> ExecutionPath {
        #[cfg(feature = "accel")]
        if self.automaton.is_some() {
            return ExecutionPath::Accelerated;
        }
        ExecutionPath::Reference
    }

    /// Find every occurrence of every pattern in `text`.
    pub fn find_all(&self, text: &str) -> Vec<PatternMatch> {
        if let Some(matches) = self.find_accelerated(text) {
            return matches;
        }
        self.find_reference(text)
    }

    #[cfg(feature = "accel")]
    fn find_accelerated(&self, text: &str) -> Option<Vec<PatternMatch>> {
        let automaton = self.automaton.as_ref()?;
        let mut out: Vec<PatternMatch> = automaton
            .find_overlapping_iter(text)
            .map(|m| PatternMatch {
                pattern: m.pattern().as_usize(),
                start: m.start(),
                end: m.end(),
            })
            .collect();
        sort_matches(&mut out);
        Some(out)
    }

    #[cfg(not(feature = "accel"))]
    fn find_accelerated(&self, _text: &str) -> Option<Vec<PatternMatch>> {
        None
    }

    /// Portable reference scan: a sliding byte window per pattern.
    fn find_reference(&self, text: &str) -> Vec<PatternMatch> {
        let hay = text.as_bytes();
        let mut out = Vec::new();
        for (index, pattern) in self.patterns.iter().enumerate() {
            let needle = pattern.as_bytes();
            if needle.is_empty() || needle.len() > hay.len() {
                continue;
            }
            for start in 0..=hay.len() - needle.len() {
                if eq_ascii_ci(&hay[start..start + needle.len()], needle) {
                    out.push(PatternMatch {
                        pattern: index,
                        start,
                        end: start + needle.len(),
                    });
                }
            }
        }
        sort_matches(&mut out);
        out
    }
}

fn sort_matches(matches: &mut [PatternMatch]) {
    matches.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then(a.end.cmp(&b.end))
            .then(a.pattern.cmp(&b.pattern))
    });
}

fn eq_ascii_ci(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| x.eq_ignore_ascii_case(y))
}
