//! Text splicing
//!
//! Applies replacement operations to source text with an index-stable
//! strategy: operations are validated once, then applied in descending
//! start order so earlier replacements never invalidate later offsets.
//! Immediately before each mutation the op is re-checked for bounds, char
//! boundaries, and overlap with already-applied ops; violators are dropped
//! with a warning, never propagated as a crash.
//!
//! The accelerated path assembles the output in a single pre-sized pass;
//! the reference path mutates a copy right-to-left with `replace_range`.
//! Identical validation feeds both, so outputs are byte-identical.

use crate::AccelFlags;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceOp {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceOutcome {
    pub text: String,
    /// Indices (into the caller's op list) actually applied, ascending.
    pub applied: Vec<usize>,
    /// Indices dropped by splice-time validation, ascending.
    pub dropped: Vec<usize>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Splicer {
    flags: AccelFlags,
}

impl Splicer {
    pub fn new(flags: AccelFlags) -> Self {
        Self { flags }
    }

    /// Apply `ops` to `text`. Idempotent for a fixed op list; an empty list
    /// is a no-op.
    pub fn apply(&self, text: &str, ops: &[SpliceOp]) -> SpliceOutcome {
        if ops.is_empty() {
            return SpliceOutcome {
                text: text.to_string(),
                applied: Vec::new(),
                dropped: Vec::new(),
            };
        }

        let (valid, dropped) = validate(text, ops);

        let out = if self.flags.splice_accelerated() {
            apply_accelerated(text, ops, &valid)
        } else {
            apply_reference(text, ops, &valid)
        };

        SpliceOutcome {
            text: out,
            applied: valid,
            dropped,
        }
    }
}

/// Validate ops in descending start order, the order both paths apply them.
/// Returns (kept indices ascending, dropped indices ascending).
fn validate(text: &str, ops: &[SpliceOp]) -> (Vec<usize>, Vec<usize>) {
    let mut order: Vec<usize> = (0..ops.len()).collect();
    order.sort_by(|&a, &b| {
        ops[b]
            .start
            .cmp(&ops[a].start)
            .then(ops[b].end.cmp(&ops[a].end))
            .then(a.cmp(&b))
    });

    let mut kept = Vec::new();
    let mut dropped = Vec::new();
    // Applying right-to-left: the lowest start applied so far bounds what
    // any later (further-left) op may reach.
    let mut lowest_applied_start = text.len() + 1;

    for index in order {
        let op = &ops[index];
        let in_bounds = op.start < op.end
            && op.end <= text.len()
            && text.is_char_boundary(op.start)
            && text.is_char_boundary(op.end);
        if !in_bounds {
            tracing::warn!(start = op.start, end = op.end, "splice op out of bounds, dropped");
            dropped.push(index);
            continue;
        }
        if op.end > lowest_applied_start {
            tracing::warn!(
                start = op.start,
                end = op.end,
                "splice op overlaps an applied replacement, dropped"
            );
            dropped.push(index);
            continue;
        }
        lowest_applied_start = op.start;
        kept.push(index);
    }

    kept.sort_unstable();
    dropped.sort_unstable();
    (kept, dropped)
}

/// Single-allocation forward assembly over the validated ops.
fn apply_accelerated(text: &str, ops: &[SpliceOp], valid: &[usize]) -> String {
    let replaced: usize = valid.iter().map(|&i| ops[i].end - ops[i].start).sum();
    let inserted: usize = valid.iter().map(|&i| ops[i].replacement.len()).sum();
    let mut out = String::with_capacity(text.len() - replaced + inserted);

    let mut cursor = 0usize;
    for &i in valid {
        let op = &ops[i];
        out.push_str(&text[cursor..op.start]);
        out.push_str(&op.replacement);
        cursor = op.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Right-to-left `replace_range`, the portable realization.
fn apply_reference(text: &str, ops: &[SpliceOp], valid: &[usize]) -> String {
    let mut out = text.to_string();
    for &i in valid.iter().rev() {
        let op = &ops[i];
        out.replace_range(op.start..op.end, &op.replacement);
    }
    out
}
