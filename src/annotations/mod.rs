// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Annotation extraction.
//!
//! Reads the endpoint-related annotations of an object: hostnames, target overrides,
//! TTL, set identifier, provider-specific attributes, controller ownership and the
//! dual-stack marker. Extraction never fails; malformed values are logged and ignored.
//!
//! # Example
//!
//! ```
//! use dns_endpoints::annotations::{hostnames_from_annotations, ttl_from_annotations};
//! use std::collections::BTreeMap;
//!
//! let mut annotations = BTreeMap::new();
//! annotations.insert(
//!     "external-dns.alpha.kubernetes.io/hostname".to_string(),
//!     "a.example.com, b.example.com".to_string(),
//! );
//! annotations.insert("external-dns.alpha.kubernetes.io/ttl".to_string(), "10m".to_string());
//!
//! assert_eq!(
//!     hostnames_from_annotations(&annotations),
//!     vec!["a.example.com", "b.example.com"]
//! );
//! assert_eq!(ttl_from_annotations(&annotations, "configmap/default/web"), 600);
//! ```

pub mod duration;
pub mod filter;

use crate::constants::{TTL_MAXIMUM_SECS, TTL_MINIMUM_SECS};
use crate::endpoint::{ProviderSpecific, ProviderSpecificProperty};
use crate::labels::{
    ALB_DUALSTACK_VALUE, ALB_IP_ADDRESS_TYPE_KEY, ALIAS_KEY, ALIAS_PROPERTY,
    ANNOTATION_KEY_PREFIX, AWS_PREFIX, CONTROLLER_KEY, CONTROLLER_VALUE, HOSTNAME_KEY,
    IBMCLOUD_PREFIX, INTERNAL_HOSTNAME_KEY, PASSTHROUGH_PROVIDER_KEYS, SCW_PREFIX,
    SET_IDENTIFIER_KEY, TARGET_KEY, TTL_KEY, WEBHOOK_PREFIX,
};
use crate::metrics;
use anyhow::{bail, Result};
use std::collections::BTreeMap;
use tracing::warn;

pub use filter::AnnotationFilter;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Splits a comma-separated annotation value, trimming entries and dropping empties.
fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Target overrides from the `target` annotation.
///
/// Entries are trimmed and lose one trailing `.`; empty entries are dropped.
#[must_use]
pub fn targets_from_annotations(annotations: &BTreeMap<String, String>) -> Vec<String> {
    annotations
        .get(TARGET_KEY)
        .map(|value| {
            split_list(value)
                .map(|t| t.strip_suffix('.').unwrap_or(t))
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Hostnames from the `hostname` annotation.
#[must_use]
pub fn hostnames_from_annotations(annotations: &BTreeMap<String, String>) -> Vec<String> {
    annotations
        .get(HOSTNAME_KEY)
        .map(|value| split_list(value).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Hostnames from the `internal-hostname` annotation.
#[must_use]
pub fn internal_hostnames_from_annotations(annotations: &BTreeMap<String, String>) -> Vec<String> {
    annotations
        .get(INTERNAL_HOSTNAME_KEY)
        .map(|value| split_list(value).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Record TTL from the `ttl` annotation, in seconds.
///
/// Accepts an integer number of seconds or a duration such as `10m` or `1h30m`
/// (fractions of a second are truncated).
///
/// # Arguments
///
/// * `annotations` - Object annotations
/// * `resource` - `kind/namespace/name` of the object, used in the warning
///
/// # Returns
///
/// The TTL, or 0 when the annotation is absent, unparseable, or outside
/// `[1, 2147483647]`. Invalid values are logged at warn level.
#[must_use]
pub fn ttl_from_annotations(annotations: &BTreeMap<String, String>, resource: &str) -> i64 {
    let Some(value) = annotations.get(TTL_KEY) else {
        return 0;
    };

    match parse_ttl(value) {
        Ok(ttl) => ttl,
        Err(e) => {
            warn!(resource = resource, value = %value, "{e}");
            metrics::record_invalid_ttl();
            0
        }
    }
}

fn parse_ttl(value: &str) -> Result<i64> {
    let ttl = match value.parse::<i64>() {
        Ok(seconds) => seconds,
        Err(_) => match duration::parse_duration_nanos(value) {
            Ok(nanos) => nanos / NANOS_PER_SECOND,
            Err(_) => bail!("\"{value}\" is not a valid TTL value"),
        },
    };

    if !(TTL_MINIMUM_SECS..=TTL_MAXIMUM_SECS).contains(&ttl) {
        bail!("TTL value {ttl} must be between [{TTL_MINIMUM_SECS}, {TTL_MAXIMUM_SECS}]");
    }
    Ok(ttl)
}

/// Set identifier from the `set-identifier` annotation, or an empty string.
#[must_use]
pub fn set_identifier_from_annotations(annotations: &BTreeMap<String, String>) -> String {
    annotations
        .get(SET_IDENTIFIER_KEY)
        .cloned()
        .unwrap_or_default()
}

/// Provider-specific pairs from the annotation namespace.
///
/// Passthrough keys (the Cloudflare family) come first with their full annotation key
/// as name. The alias preference follows as `alias=true`. Vendor-prefixed keys are then
/// mapped in sorted key order:
///
/// | annotation suffix | property name |
/// |-------------------|---------------|
/// | `aws-X`           | `aws/X`       |
/// | `scw-X`           | `scw/X`       |
/// | `webhook-X`       | `webhook/X`   |
/// | `ibmcloud-X`      | `ibmcloud-X`  |
///
/// Anything else is ignored.
#[must_use]
pub fn provider_specific_annotations(annotations: &BTreeMap<String, String>) -> ProviderSpecific {
    let mut properties = ProviderSpecific::new();

    for key in PASSTHROUGH_PROVIDER_KEYS {
        if let Some(value) = annotations.get(*key) {
            properties.push(ProviderSpecificProperty::new(*key, value.as_str()));
        }
    }

    if annotations.get(ALIAS_KEY).is_some_and(|v| v == "true") {
        properties.push(ProviderSpecificProperty::new(ALIAS_PROPERTY, "true"));
    }

    for (key, value) in annotations {
        let Some(attribute) = key.strip_prefix(ANNOTATION_KEY_PREFIX) else {
            continue;
        };

        let name = [AWS_PREFIX, SCW_PREFIX, WEBHOOK_PREFIX]
            .iter()
            .find_map(|prefix| {
                attribute.strip_prefix(prefix).map(|rest| {
                    format!("{}/{rest}", prefix.trim_end_matches('-'))
                })
            })
            .or_else(|| {
                attribute
                    .starts_with(IBMCLOUD_PREFIX)
                    .then(|| attribute.to_string())
            });

        if let Some(name) = name {
            properties.push(ProviderSpecificProperty::new(name, value.as_str()));
        }
    }

    properties
}

/// Whether the object is claimed by another controller.
///
/// True when the `controller` annotation is present with a value other than
/// `dns-controller`.
#[must_use]
pub fn is_controller_mismatch(annotations: &BTreeMap<String, String>) -> bool {
    annotations
        .get(CONTROLLER_KEY)
        .is_some_and(|controller| controller != CONTROLLER_VALUE)
}

/// Whether the object requests dual-stack records.
#[must_use]
pub fn is_dualstack(annotations: &BTreeMap<String, String>) -> bool {
    annotations
        .get(ALB_IP_ADDRESS_TYPE_KEY)
        .is_some_and(|v| v == ALB_DUALSTACK_VALUE)
}
