//! IPv4 detection with octet validation

use lazy_static::lazy_static;
use regex::Regex;

use veil_core::{IdentifierType, RedactionPolicy, Span};

use crate::builtin::spans_from_regex;
use crate::{DetectionContext, Filter};

lazy_static! {
    static ref IPV4_RE: Regex =
        Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").expect("invalid IPV4_RE");
}

fn is_valid_ipv4(candidate: &str) -> bool {
    let mut count = 0;
    for part in candidate.split('.') {
        count += 1;
        if count > 4 || part.is_empty() || part.len() > 3 {
            return false;
        }
        match part.parse::<u32>() {
            Ok(n) if n <= 255 => {}
            _ => return false,
        }
    }
    count == 4
}

pub struct IpFilter;

impl IpFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IpFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for IpFilter {
    fn name(&self) -> &'static str {
        "ip"
    }

    fn identifier(&self) -> IdentifierType {
        IdentifierType::Ip
    }

    fn detect(
        &self,
        text: &str,
        _policy: &RedactionPolicy,
        _context: &DetectionContext,
    ) -> anyhow::Result<Vec<Span>> {
        Ok(
            spans_from_regex(&IPV4_RE, text, None, IdentifierType::Ip, 0.9, "ip")
                .into_iter()
                .filter(|s| is_valid_ipv4(&s.text))
                .collect(),
        )
    }
}
