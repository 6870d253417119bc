//! Per-subsystem switches selecting accelerated vs. reference execution.
//!
//! Orthogonal to business logic: forcing the reference path changes nothing
//! about outputs, only about which implementation computes them. Used for
//! diagnosis and for the equivalence property tests.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccelFlags {
    #[serde(default)]
    pub force_reference_scan: bool,
    #[serde(default)]
    pub force_reference_interval: bool,
    #[serde(default)]
    pub force_reference_splice: bool,
}

impl AccelFlags {
    /// Force every subsystem onto the reference path.
    pub fn reference_only() -> Self {
        Self {
            force_reference_scan: true,
            force_reference_interval: true,
            force_reference_splice: true,
        }
    }

    pub fn scan_accelerated(&self) -> bool {
        !self.force_reference_scan && crate::acceleration_available()
    }

    pub fn interval_accelerated(&self) -> bool {
        !self.force_reference_interval && crate::acceleration_available()
    }

    pub fn splice_accelerated(&self) -> bool {
        !self.force_reference_splice && crate::acceleration_available()
    }
}
