//! Span-interval containment queries
//!
//! Overlap resolution and splice validation both ask "which of these ranges
//! intersect this one". The accelerated path keeps ranges sorted by start
//! with a running maximum of end offsets, pruning the scan; the reference
//! path checks every range. Both return original indices in ascending
//! order.

use crate::AccelFlags;

#[derive(Debug)]
pub struct SpanIndex {
    /// (start, end, original index), sorted by start.
    sorted: Vec<(usize, usize, usize)>,
    /// max_end[i] = max end over sorted[0..=i]. Lets the accelerated query
    /// stop walking left as soon as no earlier interval can still reach the
    /// query start.
    max_end: Vec<usize>,
    len: usize,
    flags: AccelFlags,
}

impl SpanIndex {
    pub fn build(ranges: &[(usize, usize)], flags: AccelFlags) -> Self {
        let mut sorted: Vec<(usize, usize, usize)> = ranges
            .iter()
            .enumerate()
            .map(|(i, &(s, e))| (s, e, i))
            .collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

        let mut max_end = Vec::with_capacity(sorted.len());
        let mut running = 0usize;
        for &(_, end, _) in &sorted {
            running = running.max(end);
            max_end.push(running);
        }

        Self {
            sorted,
            max_end,
            len: ranges.len(),
            flags,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Original indices of every stored range intersecting `[start, end)`.
    pub fn find_overlapping(&self, start: usize, end: usize) -> Vec<usize> {
        if start >= end || self.sorted.is_empty() {
            return Vec::new();
        }
        let mut hits = if self.flags.interval_accelerated() {
            self.query_accelerated(start, end)
        } else {
            self.query_reference(start, end)
        };
        hits.sort_unstable();
        hits
    }

    pub fn any_overlapping(&self, start: usize, end: usize) -> bool {
        !self.find_overlapping(start, end).is_empty()
    }

    fn query_accelerated(&self, start: usize, end: usize) -> Vec<usize> {
        // First interval with start >= query end can never intersect, nor
        // can anything after it.
        let cutoff = self.sorted.partition_point(|&(s, _, _)| s < end);
        let mut hits = Vec::new();
        for i in (0..cutoff).rev() {
            if self.max_end[i] <= start {
                // Nothing to the left reaches the query anymore.
                break;
            }
            let (_, e, original) = self.sorted[i];
            if e > start {
                hits.push(original);
            }
        }
        hits
    }

    fn query_reference(&self, start: usize, end: usize) -> Vec<usize> {
        self.sorted
            .iter()
            .filter(|&&(s, e, _)| s < end && e > start)
            .map(|&(_, _, original)| original)
            .collect()
    }
}
