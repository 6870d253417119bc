//! Span data model
//!
//! A span describes one detected occurrence of a sensitive identifier.
//! Offsets are byte positions into the UTF-8 source text, half-open
//! `[start, end)`, and must sit on `char` boundaries. This is the single
//! indexing convention of the whole pipeline; no other unit ever crosses a
//! module boundary.
//!
//! Lifecycle: created by a filter's `detect`, mutated only during overlap
//! resolution (`ignored`, `ambiguous_with`) and splicing (`replacement`,
//! `applied`), then discarded once the redacted text exists. A span is
//! immutable once applied, and `original_value` never outlives the call
//! that produced the redaction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{IdentifierType, Result, VeilError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    /// Unique id, referenced by `ambiguous_with` on overlapping spans.
    pub id: Uuid,
    pub identifier: IdentifierType,
    /// Byte offset of the first matched byte.
    pub start: usize,
    /// Byte offset one past the last matched byte.
    pub end: usize,
    /// Matched text as the filter reported it (possibly normalized).
    pub text: String,
    /// Exact source slice. Cleared before spans leave the engine.
    pub original_value: String,
    /// Detection confidence in [0, 1].
    pub confidence: f64,
    /// Lower wins overlap resolution outright.
    pub priority: u32,
    /// Name of the filter that produced this span.
    pub source: String,
    /// Replacement token, `None` until splicing assigns one.
    pub replacement: Option<String>,
    /// Session salt fingerprint when a consistency token was assigned.
    pub salt: Option<String>,
    /// Ids of overlapping spans this one beat during resolution.
    pub ambiguous_with: Vec<Uuid>,
    /// Diagnostic composite used in reports, never in decisions.
    pub disambiguation_score: Option<f64>,
    /// Loser of overlap resolution; never reaches splicing.
    pub ignored: bool,
    applied: bool,
}

impl Span {
    pub fn new(
        identifier: IdentifierType,
        start: usize,
        end: usize,
        text: impl Into<String>,
        confidence: f64,
        source: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Self {
            id: Uuid::new_v4(),
            identifier,
            start,
            end,
            original_value: text.clone(),
            text,
            confidence,
            priority: identifier.default_priority(),
            source: source.into(),
            replacement: None,
            salt: None,
            ambiguous_with: Vec::new(),
            disambiguation_score: None,
            ignored: false,
            applied: false,
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = Some(replacement.into());
        self
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Half-open ranges intersect.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// This span fully covers `other`.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    pub fn applied(&self) -> bool {
        self.applied
    }

    /// Validate integrity against the source text this span points into.
    pub fn validate(&self, source: &str) -> Result<()> {
        if self.start >= self.end {
            return Err(VeilError::InvalidSpan {
                detail: format!("empty or inverted range {}..{}", self.start, self.end),
            });
        }
        if self.end > source.len() {
            return Err(VeilError::SpanOutOfBounds {
                start: self.start,
                end: self.end,
                len: source.len(),
            });
        }
        if !source.is_char_boundary(self.start) || !source.is_char_boundary(self.end) {
            return Err(VeilError::InvalidSpan {
                detail: format!("range {}..{} splits a character", self.start, self.end),
            });
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(VeilError::InvalidSpan {
                detail: format!("confidence {} outside [0, 1]", self.confidence),
            });
        }
        Ok(())
    }

    /// Set the replacement token. Rejected once the span has been applied.
    pub fn set_replacement(&mut self, replacement: impl Into<String>) -> Result<()> {
        if self.applied {
            return Err(VeilError::InvalidSpan {
                detail: "replacement change on an applied span".into(),
            });
        }
        self.replacement = Some(replacement.into());
        Ok(())
    }

    /// Finalize the span after its replacement was spliced in. The span is
    /// immutable from this point on.
    pub fn mark_applied(&mut self) -> Result<()> {
        if self.applied {
            return Err(VeilError::InvalidSpan {
                detail: "span applied twice".into(),
            });
        }
        if self.ignored {
            return Err(VeilError::InvalidSpan {
                detail: "ignored span reached splicing".into(),
            });
        }
        self.applied = true;
        Ok(())
    }

    /// Mark this span as an overlap-resolution loser.
    pub fn mark_ignored(&mut self) {
        if !self.applied {
            self.ignored = true;
        }
    }

    /// Drop the sensitive source slice before the span leaves the engine.
    pub fn scrub_original(&mut self) {
        self.original_value.clear();
    }
}
