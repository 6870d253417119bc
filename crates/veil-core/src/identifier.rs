//! Identifier taxonomy
//!
//! Every detector reports exactly one identifier type. Priorities are a
//! static per-type rank: lower value wins overlap resolution outright,
//! regardless of confidence.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentifierType {
    Ssn,
    Mrn,
    CreditCard,
    Account,
    License,
    Passport,
    HealthPlan,
    Email,
    Phone,
    Fax,
    Ip,
    Url,
    MacAddress,
    Device,
    Vehicle,
    Date,
    ZipCode,
    Address,
    City,
    State,
    Age,
    ProviderName,
    Name,
    Occupation,
    Custom,
}

impl IdentifierType {
    /// Default precedence rank for overlap resolution. Lower wins.
    ///
    /// Direct identifiers (SSN, MRN) outrank structured contact data, which
    /// outranks quasi-identifiers like dates and names.
    pub fn default_priority(self) -> u32 {
        match self {
            Self::Ssn | Self::Mrn => 1,
            Self::CreditCard
            | Self::Account
            | Self::License
            | Self::Passport
            | Self::HealthPlan
            | Self::Email => 2,
            Self::Phone
            | Self::Fax
            | Self::Ip
            | Self::Url
            | Self::MacAddress
            | Self::Device
            | Self::Vehicle => 3,
            Self::Date | Self::ZipCode | Self::Address => 4,
            Self::City
            | Self::State
            | Self::Age
            | Self::ProviderName
            | Self::Name => 5,
            Self::Occupation => 6,
            Self::Custom => 7,
        }
    }

    /// Stable uppercase tag used in templates, tokens, and reports.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Ssn => "SSN",
            Self::Mrn => "MRN",
            Self::CreditCard => "CREDIT_CARD",
            Self::Account => "ACCOUNT",
            Self::License => "LICENSE",
            Self::Passport => "PASSPORT",
            Self::HealthPlan => "HEALTH_PLAN",
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
            Self::Fax => "FAX",
            Self::Ip => "IP",
            Self::Url => "URL",
            Self::MacAddress => "MAC_ADDRESS",
            Self::Device => "DEVICE",
            Self::Vehicle => "VEHICLE",
            Self::Date => "DATE",
            Self::ZipCode => "ZIPCODE",
            Self::Address => "ADDRESS",
            Self::City => "CITY",
            Self::State => "STATE",
            Self::Age => "AGE",
            Self::ProviderName => "PROVIDER_NAME",
            Self::Name => "NAME",
            Self::Occupation => "OCCUPATION",
            Self::Custom => "CUSTOM",
        }
    }

    /// Replacement template used when neither the filter nor the policy
    /// supplies one.
    pub fn default_template(self) -> String {
        format!("[{}]", self.tag())
    }

    /// True for types whose canonical form is the digit sequence alone.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Ssn | Self::Mrn | Self::Phone | Self::Fax | Self::ZipCode | Self::CreditCard
        )
    }

    /// All known identifier types, in priority-table order.
    pub fn all() -> &'static [IdentifierType] {
        &[
            Self::Ssn,
            Self::Mrn,
            Self::CreditCard,
            Self::Account,
            Self::License,
            Self::Passport,
            Self::HealthPlan,
            Self::Email,
            Self::Phone,
            Self::Fax,
            Self::Ip,
            Self::Url,
            Self::MacAddress,
            Self::Device,
            Self::Vehicle,
            Self::Date,
            Self::ZipCode,
            Self::Address,
            Self::City,
            Self::State,
            Self::Age,
            Self::ProviderName,
            Self::Name,
            Self::Occupation,
            Self::Custom,
        ]
    }
}

impl std::fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_identifiers_outrank_names() {
        assert!(IdentifierType::Ssn.default_priority() < IdentifierType::Name.default_priority());
        assert!(IdentifierType::Mrn.default_priority() < IdentifierType::Date.default_priority());
    }

    #[test]
    fn test_tag_roundtrips_through_serde() {
        let json = serde_json::to_string(&IdentifierType::CreditCard).unwrap();
        assert_eq!(json, "\"CREDIT_CARD\"");
        let back: IdentifierType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, IdentifierType::CreditCard);
    }

    #[test]
    fn test_default_template() {
        assert_eq!(IdentifierType::Ssn.default_template(), "[SSN]");
    }

    #[test]
    fn test_all_covers_every_tag_once() {
        let tags: std::collections::HashSet<_> =
            IdentifierType::all().iter().map(|t| t.tag()).collect();
        assert_eq!(tags.len(), IdentifierType::all().len());
    }
}
