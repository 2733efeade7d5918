// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Endpoint synthesis.
//!
//! Turns host candidates and target candidates into endpoints. Targets are classified
//! with [`classify`] and grouped by record type, so one hostname can yield up to three
//! endpoints (A, AAAA, CNAME).
//!
//! A target list mixing IP literals and hostnames produces both an address endpoint and
//! a CNAME endpoint for the same name. Downstream planning decides what to do with that.

use crate::endpoint::{Endpoint, ProviderSpecific};
use crate::labels::RESOURCE_LABEL_KEY;
use crate::merge::merge_endpoints;
use crate::record_type::{classify, RecordType};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, error};

/// Builds one endpoint per (hostname, record type) from the cross product of inputs.
///
/// Hostnames are deduplicated and sorted. Targets are grouped by record type, and each
/// group is deduplicated and sorted. The output is ordered by hostname, then by record
/// type (A, AAAA, CNAME), so it does not depend on input order or duplicates.
///
/// Hostnames with a label longer than 63 characters are skipped with an error log.
///
/// # Returns
///
/// No endpoints when either list is empty.
///
/// # Example
///
/// ```
/// use dns_endpoints::record_type::RecordType;
/// use dns_endpoints::synthesis::endpoints_for_hosts_and_targets;
///
/// let endpoints = endpoints_for_hosts_and_targets(
///     &["a.com"],
///     &["1.2.3.4", "2001:db8::1", "b.com"],
/// );
///
/// assert_eq!(endpoints.len(), 3);
/// assert_eq!(endpoints[0].record_type, Some(RecordType::A));
/// assert_eq!(endpoints[1].record_type, Some(RecordType::AAAA));
/// assert_eq!(endpoints[2].record_type, Some(RecordType::CNAME));
/// ```
#[must_use]
pub fn endpoints_for_hosts_and_targets<H, T>(hostnames: &[H], targets: &[T]) -> Vec<Endpoint>
where
    H: AsRef<str>,
    T: AsRef<str>,
{
    if hostnames.is_empty() || targets.is_empty() {
        return Vec::new();
    }

    let hosts: BTreeSet<&str> = hostnames.iter().map(AsRef::as_ref).collect();
    let grouped = group_by_type(targets.iter().map(AsRef::as_ref));

    let mut endpoints = Vec::with_capacity(hosts.len() * grouped.len());
    for host in hosts {
        for (record_type, group) in &grouped {
            match Endpoint::try_new(host, Some(*record_type), 0, group.iter().copied()) {
                Ok(ep) => endpoints.push(ep),
                Err(e) => {
                    error!(hostname = host, "{e}");
                    break;
                }
            }
        }
    }
    endpoints
}

/// Trims `target` and removes one trailing `.`; classification and dedup see this form.
fn normalize_target(target: &str) -> &str {
    let target = target.trim();
    target.strip_suffix('.').unwrap_or(target)
}

/// Groups targets by inferred record type; each group is deduplicated and sorted.
///
/// Targets are normalised first, so `1.2.3.4.` is an A target and `b.com` and `b.com.`
/// are the same target. Targets empty after normalisation are dropped.
pub(crate) fn group_by_type<'a, I>(targets: I) -> BTreeMap<RecordType, BTreeSet<&'a str>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut grouped: BTreeMap<RecordType, BTreeSet<&str>> = BTreeMap::new();
    for target in targets.into_iter().map(normalize_target) {
        if target.is_empty() {
            continue;
        }
        grouped.entry(classify(target)).or_default().insert(target);
    }
    grouped
}

/// Builds one endpoint per `host:target` pair.
///
/// Each pair is split on its first `:` only, so IPv6 targets survive. Pairs without a
/// separator, or with an empty host or target after trimming, are skipped with a debug
/// log naming `resource`. The result is merged.
///
/// # Arguments
///
/// * `pairs` - `host:target` strings, typically from a template
/// * `resource` - `kind namespace/name` of the object, for diagnostics
#[must_use]
pub fn endpoints_for_host_target_pairs<P: AsRef<str>>(pairs: &[P], resource: &str) -> Vec<Endpoint> {
    let mut endpoints = Vec::with_capacity(pairs.len());

    for pair in pairs {
        let pair = pair.as_ref();
        let Some((host, target)) = pair.split_once(crate::constants::HOST_TARGET_SEPARATOR) else {
            debug!(
                pair = pair,
                resource = resource,
                "Skipping invalid host:target pair: missing ':' separator"
            );
            continue;
        };

        let host = host.trim();
        let target = normalize_target(target);
        if host.is_empty() || target.is_empty() {
            debug!(
                pair = pair,
                resource = resource,
                "Skipping incomplete host:target pair: field may not yet be populated"
            );
            continue;
        }

        match Endpoint::try_new(host, Some(classify(target)), 0, [target]) {
            Ok(ep) => endpoints.push(ep),
            Err(e) => error!(resource = resource, "{e}"),
        }
    }

    merge_endpoints(endpoints)
}

/// Builds the endpoints of a single hostname, one per record type present in `targets`.
///
/// Targets are trimmed and lose one trailing `.` before classification; they keep their
/// input order within each type, without repeats. Every endpoint carries `ttl`,
/// `provider_specific` and `set_identifier`; the `resource` label is set when `resource`
/// is non-empty.
#[must_use]
pub fn endpoints_for_hostname<T: AsRef<str>>(
    hostname: &str,
    targets: &[T],
    ttl: i64,
    provider_specific: &ProviderSpecific,
    set_identifier: &str,
    resource: &str,
) -> Vec<Endpoint> {
    let mut by_type: BTreeMap<RecordType, Vec<&str>> = BTreeMap::new();
    for target in targets {
        let target = normalize_target(target.as_ref());
        if target.is_empty() {
            continue;
        }
        let group = by_type.entry(classify(target)).or_default();
        if !group.contains(&target) {
            group.push(target);
        }
    }

    let mut endpoints = Vec::with_capacity(by_type.len());
    for (record_type, group) in by_type {
        let mut ep = match Endpoint::try_new(hostname, Some(record_type), ttl, group) {
            Ok(ep) => ep,
            Err(e) => {
                error!(resource = resource, "{e}");
                return Vec::new();
            }
        };
        ep.provider_specific = provider_specific.clone();
        ep.set_identifier = set_identifier.to_string();
        if !resource.is_empty() {
            ep.labels
                .insert(RESOURCE_LABEL_KEY.to_string(), resource.to_string());
        }
        endpoints.push(ep);
    }
    endpoints
}

#[cfg(test)]
#[path = "synthesis_tests.rs"]
mod synthesis_tests;
