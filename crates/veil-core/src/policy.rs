//! Redaction policy
//!
//! The policy is consumed, never produced, by the core: it says which
//! identifier types are enabled, the per-type confidence threshold a span
//! must clear, and the replacement template used when no consistency token
//! applies. Policy compilation from a rule language lives outside this
//! workspace.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::IdentifierType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionPolicy {
    /// Enabled identifier types. `None` enables everything.
    #[serde(default)]
    pub enabled: Option<HashSet<IdentifierType>>,

    /// Per-type minimum confidence. Spans below the threshold are discarded
    /// before overlap resolution.
    #[serde(default)]
    pub thresholds: HashMap<IdentifierType, f64>,

    #[serde(default = "default_threshold")]
    pub default_threshold: f64,

    /// Per-type replacement templates overriding the built-in `[TAG]` form.
    #[serde(default)]
    pub templates: HashMap<IdentifierType, String>,

    /// Ask splicing for session-stable tokens from the consistency manager.
    #[serde(default = "default_true")]
    pub consistent_tokens: bool,
}

impl Default for RedactionPolicy {
    fn default() -> Self {
        Self {
            enabled: None,
            thresholds: HashMap::new(),
            default_threshold: default_threshold(),
            templates: HashMap::new(),
            consistent_tokens: true,
        }
    }
}

fn default_threshold() -> f64 {
    0.5
}

fn default_true() -> bool {
    true
}

impl RedactionPolicy {
    /// Policy with only the given types enabled.
    pub fn only(types: impl IntoIterator<Item = IdentifierType>) -> Self {
        Self {
            enabled: Some(types.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn is_enabled(&self, identifier: IdentifierType) -> bool {
        match &self.enabled {
            Some(set) => set.contains(&identifier),
            None => true,
        }
    }

    pub fn threshold_for(&self, identifier: IdentifierType) -> f64 {
        self.thresholds
            .get(&identifier)
            .copied()
            .unwrap_or(self.default_threshold)
    }

    pub fn template_for(&self, identifier: IdentifierType) -> String {
        self.templates
            .get(&identifier)
            .cloned()
            .unwrap_or_else(|| identifier.default_template())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enables_everything() {
        let policy = RedactionPolicy::default();
        assert!(policy.is_enabled(IdentifierType::Ssn));
        assert!(policy.is_enabled(IdentifierType::Occupation));
        assert_eq!(policy.threshold_for(IdentifierType::Name), 0.5);
    }

    #[test]
    fn test_only_restricts_types() {
        let policy = RedactionPolicy::only([IdentifierType::Ssn, IdentifierType::Name]);
        assert!(policy.is_enabled(IdentifierType::Ssn));
        assert!(!policy.is_enabled(IdentifierType::Email));
    }

    #[test]
    fn test_template_fallback() {
        let mut policy = RedactionPolicy::default();
        policy
            .templates
            .insert(IdentifierType::Name, "<redacted name>".into());
        assert_eq!(policy.template_for(IdentifierType::Name), "<redacted name>");
        assert_eq!(policy.template_for(IdentifierType::Ssn), "[SSN]");
    }

    #[test]
    fn test_per_type_threshold() {
        let mut policy = RedactionPolicy::default();
        policy.thresholds.insert(IdentifierType::Name, 0.8);
        assert_eq!(policy.threshold_for(IdentifierType::Name), 0.8);
        assert_eq!(policy.threshold_for(IdentifierType::Date), 0.5);
    }
}
