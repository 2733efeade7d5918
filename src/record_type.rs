// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS record types produced by the engine and the target classifier.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Record type of a synthesized endpoint.
///
/// Declaration order matches lexicographic order of the type names, so the derived
/// `Ord` iterates `A`, `AAAA`, `CNAME`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    AAAA,
    /// Canonical name record
    CNAME,
}

impl RecordType {
    /// Record type name as used in zone files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::AAAA => "AAAA",
            Self::CNAME => "CNAME",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Infers the record type for a target value.
///
/// IPv6 literals are `AAAA`, IPv4 literals are `A`, everything else (including the
/// empty string) is `CNAME`.
///
/// # Example
///
/// ```
/// use dns_endpoints::record_type::{classify, RecordType};
///
/// assert_eq!(classify("10.0.0.1"), RecordType::A);
/// assert_eq!(classify("2001:db8::1"), RecordType::AAAA);
/// assert_eq!(classify("lb.example.com"), RecordType::CNAME);
/// ```
#[must_use]
pub fn classify(target: &str) -> RecordType {
    if target.parse::<Ipv6Addr>().is_ok() {
        RecordType::AAAA
    } else if target.parse::<Ipv4Addr>().is_ok() {
        RecordType::A
    } else {
        RecordType::CNAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let cases = [
            ("1.2.3.4", RecordType::A),
            ("255.255.255.255", RecordType::A),
            ("2001:db8::1", RecordType::AAAA),
            ("::1", RecordType::AAAA),
            ("::ffff:1.2.3.4", RecordType::AAAA),
            ("lb.example.com", RecordType::CNAME),
            ("1.2.3.4.nip.io", RecordType::CNAME),
            ("256.1.1.1", RecordType::CNAME),
            ("", RecordType::CNAME),
        ];

        for (target, expected) in cases {
            assert_eq!(classify(target), expected, "target {target:?}");
        }
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let mut types = vec![RecordType::CNAME, RecordType::A, RecordType::AAAA];
        types.sort();
        assert_eq!(types, vec![RecordType::A, RecordType::AAAA, RecordType::CNAME]);
    }

    #[test]
    fn test_display() {
        assert_eq!(RecordType::AAAA.to_string(), "AAAA");
        assert_eq!(serde_json::to_string(&RecordType::CNAME).unwrap(), "\"CNAME\"");
    }
}
