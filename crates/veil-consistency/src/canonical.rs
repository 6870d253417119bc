//! Canonical keys for detected values

use serde::{Deserialize, Serialize};

use veil_core::IdentifierType;

/// Identity of a detected value after normalization. Two raw strings with
/// the same canonical key receive the same replacement token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalKey {
    pub identifier: IdentifierType,
    pub value: String,
}

/// Reduce a raw detected value to its canonical form.
///
/// Digit-shaped identifiers keep only their digits, so `123-45-6789` and
/// `123 45 6789` collide. Names fold `Last, First` into `first last`.
/// Everything else is trimmed, lowercased, and whitespace-collapsed.
pub fn canonicalize(identifier: IdentifierType, raw: &str) -> CanonicalKey {
    let value = if identifier.is_numeric() {
        raw.chars().filter(|c| c.is_ascii_digit()).collect()
    } else if identifier == IdentifierType::Name {
        canonical_name(raw)
    } else {
        collapse(raw)
    };
    CanonicalKey { identifier, value }
}

fn collapse(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn canonical_name(raw: &str) -> String {
    let trimmed = raw.trim();
    // Exactly one comma means inverted order; more than one is not a name form
    // we reorder.
    let parts: Vec<&str> = trimmed.splitn(3, ',').collect();
    if parts.len() == 2 {
        collapse(&format!("{} {}", parts[1], parts[0]))
    } else {
        collapse(trimmed)
    }
}
