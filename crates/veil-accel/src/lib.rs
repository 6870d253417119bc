//! Accelerated-path adapters for veil's hot operations
//!
//! Each hot operation (multi-pattern scanning, span-interval queries, text
//! splicing) has two realizations: a portable reference implementation and
//! an optional accelerated one. The adapter tries the accelerated backend
//! when it is available and not disabled by a feature flag, and falls back
//! to the reference implementation for that call on any failure. The two
//! paths are output-equivalent; which one ran is never visible to callers
//! except through timings and debug logs.
//!
//! Unavailability of acceleration is a performance degradation, never an
//! error: it is logged once and cached for the process lifetime.

pub mod cache;
pub mod flags;
pub mod interval;
pub mod scanner;
pub mod splice;

pub use cache::ScannerCache;
pub use flags::AccelFlags;
pub use interval::SpanIndex;
pub use scanner::{MultiPatternScanner, PatternMatch};
pub use splice::{SpliceOp, SpliceOutcome, Splicer};

use std::sync::OnceLock;

/// Which realization served a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPath {
    Accelerated,
    Reference,
}

static AVAILABLE: OnceLock<bool> = OnceLock::new();

/// Probe the accelerated backend once per process and cache the answer.
/// Never retried per call.
pub fn acceleration_available() -> bool {
    *AVAILABLE.get_or_init(|| {
        let ok = probe();
        if ok {
            tracing::debug!("accelerated backend available");
        } else {
            tracing::warn!("accelerated backend unavailable, using reference implementations");
        }
        ok
    })
}

#[cfg(feature = "accel")]
fn probe() -> bool {
    // A trivial automaton build exercises the backend end to end.
    aho_corasick::AhoCorasick::new(["probe"]).is_ok()
}

#[cfg(not(feature = "accel"))]
fn probe() -> bool {
    false
}
