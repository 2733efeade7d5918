// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Canonical endpoint model.
//!
//! An [`Endpoint`] is one DNS record set: an owner name, a record type, and the targets
//! the name resolves to, plus the metadata (TTL, set identifier, provider-specific
//! pairs, labels) downstream consumers need to reconcile it.

use crate::constants::DNS_LABEL_MAX_LENGTH;
use crate::errors::EndpointError;
use crate::labels::OWNER_LABEL_KEY;
use crate::record_type::RecordType;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::net::IpAddr;
use tracing::debug;

/// Free-form endpoint labels (`resource`, `owner`, `dualstack`, ...)
pub type Labels = BTreeMap<String, String>;

// ============================================================================
// Targets
// ============================================================================

/// Ordered list of record targets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Targets(pub Vec<String>);

impl Targets {
    /// Creates a target list, stripping one trailing `.` from every entry.
    #[must_use]
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            targets
                .into_iter()
                .map(|t| {
                    let t: String = t.into();
                    t.strip_suffix('.').map(str::to_string).unwrap_or(t)
                })
                .collect(),
        )
    }

    /// Number of targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list has no targets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the targets in their current order.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Returns `true` when both lists hold the same targets, ignoring order and case.
    ///
    /// IP addresses are compared by value, so `2001:db8::1` and `2001:0db8::0001` are
    /// the same target.
    #[must_use]
    pub fn same(&self, other: &Targets) -> bool {
        if self.len() != other.len() {
            return false;
        }

        let mut left = self.0.clone();
        let mut right = other.0.clone();
        left.sort();
        right.sort();

        left.iter().zip(right.iter()).all(|(a, b)| {
            if a.eq_ignore_ascii_case(b) {
                return true;
            }
            matches!(
                (a.parse::<IpAddr>(), b.parse::<IpAddr>()),
                (Ok(x), Ok(y)) if x == y
            )
        })
    }

    /// Orders two target lists for deterministic comparisons.
    ///
    /// Shorter lists sort first. Lists of equal length are compared element-wise after
    /// sorting: IP addresses by value, IPs before hostnames, hostnames lexically.
    #[must_use]
    pub fn is_less(&self, other: &Targets) -> bool {
        match self.len().cmp(&other.len()) {
            Ordering::Less => return true,
            Ordering::Greater => return false,
            Ordering::Equal => {}
        }

        let mut left = self.0.clone();
        let mut right = other.0.clone();
        left.sort();
        right.sort();

        for (a, b) in left.iter().zip(right.iter()) {
            if a == b {
                continue;
            }
            return match (a.parse::<IpAddr>(), b.parse::<IpAddr>()) {
                (Ok(x), Ok(y)) => x < y,
                (Ok(_), Err(_)) => true,
                (Err(_), Ok(_)) => false,
                (Err(_), Err(_)) => a < b,
            };
        }
        false
    }
}

impl fmt::Display for Targets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(";"))
    }
}

impl From<Vec<String>> for Targets {
    fn from(targets: Vec<String>) -> Self {
        Self::new(targets)
    }
}

impl<'a> IntoIterator for &'a Targets {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// Provider-Specific Properties
// ============================================================================

/// Opaque name/value pair forwarded to DNS providers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderSpecificProperty {
    pub name: String,
    pub value: String,
}

impl ProviderSpecificProperty {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Ordered provider-specific pairs.
pub type ProviderSpecific = Vec<ProviderSpecificProperty>;

// ============================================================================
// Endpoint
// ============================================================================

/// Identity of an endpoint for duplicate removal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointKey {
    pub dns_name: String,
    pub record_type: Option<RecordType>,
    pub set_identifier: String,
}

/// One DNS record set.
///
/// `record_ttl == 0` means no TTL is configured. An empty `set_identifier` means none.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Owner name, without trailing dot
    pub dns_name: String,

    /// Record targets, without trailing dots
    #[serde(default)]
    pub targets: Targets,

    /// Record type; `None` only for empty-target endpoints awaiting default targets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<RecordType>,

    /// Distinguishes records sharing name and type (weighted/geo routing)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub set_identifier: String,

    /// TTL in seconds
    #[serde(default, rename = "recordTTL", skip_serializing_if = "is_zero")]
    pub record_ttl: i64,

    /// Provenance and ownership labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: Labels,

    /// Provider-specific pairs, passed through unchanged
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provider_specific: ProviderSpecific,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(ttl: &i64) -> bool {
    *ttl == 0
}

impl Endpoint {
    /// Creates an endpoint, normalising trailing dots on the name and targets.
    ///
    /// # Arguments
    ///
    /// * `dns_name` - Owner name; one trailing `.` is removed
    /// * `record_type` - Record type, or `None` for an untyped endpoint
    /// * `record_ttl` - TTL in seconds, 0 for unset
    /// * `targets` - Record targets; one trailing `.` is removed from each
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::LabelTooLong`] when a label of `dns_name` exceeds
    /// 63 characters.
    pub fn try_new<I, S>(
        dns_name: &str,
        record_type: Option<RecordType>,
        record_ttl: i64,
        targets: I,
    ) -> Result<Self, EndpointError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dns_name = dns_name.strip_suffix('.').unwrap_or(dns_name);

        if let Some(label) = dns_name
            .split('.')
            .find(|label| label.len() > DNS_LABEL_MAX_LENGTH)
        {
            return Err(EndpointError::LabelTooLong {
                label: label.to_string(),
                dns_name: dns_name.to_string(),
            });
        }

        Ok(Self {
            dns_name: dns_name.to_string(),
            targets: Targets::new(targets),
            record_type,
            record_ttl,
            ..Self::default()
        })
    }

    /// Adds or replaces a label.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_set_identifier(mut self, set_identifier: impl Into<String>) -> Self {
        self.set_identifier = set_identifier.into();
        self
    }

    /// Appends provider-specific pairs.
    #[must_use]
    pub fn with_provider_specific(mut self, properties: ProviderSpecific) -> Self {
        self.provider_specific.extend(properties);
        self
    }

    /// Applies a TTL floor: sets `ttl` only when no TTL is configured and `ttl > 0`.
    #[must_use]
    pub fn with_min_ttl(mut self, ttl: i64) -> Self {
        if self.record_ttl == 0 && ttl > 0 {
            debug!(
                dns_name = %self.dns_name,
                ttl = ttl,
                "Applying minimum TTL"
            );
            self.record_ttl = ttl;
        }
        self
    }

    /// Looks up a provider-specific value by name.
    #[must_use]
    pub fn get_provider_specific_property(&self, name: &str) -> Option<&str> {
        self.provider_specific
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Sets a provider-specific value, replacing an existing pair of the same name.
    pub fn set_provider_specific_property(&mut self, name: &str, value: &str) {
        if let Some(existing) = self.provider_specific.iter_mut().find(|p| p.name == name) {
            existing.value = value.to_string();
            return;
        }
        self.provider_specific
            .push(ProviderSpecificProperty::new(name, value));
    }

    /// Removes every provider-specific pair with the given name.
    pub fn delete_provider_specific_property(&mut self, name: &str) {
        self.provider_specific.retain(|p| p.name != name);
    }

    /// Identity used by [`remove_duplicates`].
    #[must_use]
    pub fn key(&self) -> EndpointKey {
        EndpointKey {
            dns_name: self.dns_name.clone(),
            record_type: self.record_type,
            set_identifier: self.set_identifier.clone(),
        }
    }

    /// Whether the `owner` label equals `owner_id`.
    #[must_use]
    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.labels
            .get(OWNER_LABEL_KEY)
            .is_some_and(|owner| owner == owner_id)
    }

    /// Sorts and deduplicates the targets in place.
    pub fn unique_ordered_targets(&mut self) {
        self.targets.0.sort();
        self.targets.0.dedup();
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record_type = self.record_type.map(RecordType::as_str).unwrap_or_default();
        let provider_specific = self
            .provider_specific
            .iter()
            .map(|p| format!("{}={}", p.name, p.value))
            .collect::<Vec<_>>()
            .join(" ");

        write!(
            f,
            "{} {} IN {} {} {} [{}]",
            self.dns_name,
            self.record_ttl,
            record_type,
            self.set_identifier,
            self.targets,
            provider_specific
        )
    }
}

// ============================================================================
// List Operations
// ============================================================================

/// Keeps the first endpoint for every `(dns_name, record_type, set_identifier)`.
#[must_use]
pub fn remove_duplicates(endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
    let mut seen = HashSet::new();
    endpoints
        .into_iter()
        .filter(|ep| {
            let fresh = seen.insert(ep.key());
            if !fresh {
                debug!(endpoint = %ep, "Removing duplicate endpoint");
            }
            fresh
        })
        .collect()
}

/// Keeps endpoints whose `owner` label equals `owner_id`.
#[must_use]
pub fn filter_by_owner_id(owner_id: &str, endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
    endpoints
        .into_iter()
        .filter(|ep| {
            let owned = ep.is_owned_by(owner_id);
            if !owned {
                debug!(
                    endpoint = %ep,
                    owner = ?ep.labels.get(OWNER_LABEL_KEY),
                    expected_owner = owner_id,
                    "Skipping endpoint because owner id does not match"
                );
            }
            owned
        })
        .collect()
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod endpoint_tests;
