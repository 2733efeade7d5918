// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Endpoint merge and deduplication.
//!
//! Endpoints sharing `(dns_name, record_type, set_identifier, record_ttl)` collapse into
//! one endpoint carrying the union of their targets. CNAME endpoints never union: a name
//! has a single canonical target, so the first candidate for a `(dns_name,
//! set_identifier)` wins and conflicting candidates are reported.

use crate::endpoint::Endpoint;
use crate::metrics;
use crate::record_type::RecordType;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct MergeKey {
    dns_name: String,
    record_type: Option<RecordType>,
    set_identifier: String,
    record_ttl: i64,
}

impl MergeKey {
    fn of(ep: &Endpoint) -> Self {
        Self {
            dns_name: ep.dns_name.clone(),
            record_type: ep.record_type,
            set_identifier: ep.set_identifier.clone(),
            record_ttl: ep.record_ttl,
        }
    }
}

/// Merges endpoint candidates.
///
/// - Non-CNAME candidates with the same key are combined by appending targets.
/// - CNAME candidates without targets are dropped.
/// - A CNAME candidate whose `(dns_name, set_identifier)` already has a CNAME with
///   different targets is dropped with a warning; exact duplicates (same TTL and
///   targets) are dropped silently. The same target at a different TTL is kept as a
///   separate endpoint.
/// - A CNAME candidate with several targets is kept as-is, with a warning.
///
/// Each resulting endpoint has sorted, deduplicated targets. Endpoints are returned in
/// first-seen order of their keys, and `merge_endpoints(merge_endpoints(x))` equals
/// `merge_endpoints(x)`.
#[must_use]
pub fn merge_endpoints(endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
    let mut merged: Vec<Endpoint> = Vec::with_capacity(endpoints.len());
    let mut by_key: HashMap<MergeKey, usize> = HashMap::new();
    let mut cnames: HashMap<(String, String), Vec<usize>> = HashMap::new();

    for ep in endpoints {
        if ep.record_type == Some(RecordType::CNAME) {
            if ep.targets.is_empty() {
                debug!(dns_name = %ep.dns_name, "Skipping CNAME endpoint without targets");
                continue;
            }

            let identity = (ep.dns_name.clone(), ep.set_identifier.clone());
            let kept = cnames.get(&identity).map(Vec::as_slice).unwrap_or_default();

            let duplicate = kept.iter().any(|&i| {
                merged[i].record_ttl == ep.record_ttl && merged[i].targets.same(&ep.targets)
            });
            if duplicate {
                continue;
            }

            // Same target at another TTL is a separate endpoint; another target is not.
            if let Some(&conflict) = kept.iter().find(|&&i| !merged[i].targets.same(&ep.targets)) {
                warn!(
                    dns_name = %ep.dns_name,
                    set_identifier = %ep.set_identifier,
                    kept_target = %merged[conflict].targets,
                    ignored_target = %ep.targets,
                    "Conflicting CNAME targets: DNS allows only one canonical name, keeping the first"
                );
                metrics::record_cname_conflict();
                continue;
            }

            if ep.targets.len() > 1 {
                warn!(
                    dns_name = %ep.dns_name,
                    targets = %ep.targets,
                    "CNAME endpoint has more than one target"
                );
            }

            cnames.entry(identity).or_default().push(merged.len());
            merged.push(ep);
            continue;
        }

        let key = MergeKey::of(&ep);
        match by_key.get(&key) {
            Some(&existing) => merged[existing].targets.0.extend(ep.targets.0),
            None => {
                by_key.insert(key, merged.len());
                merged.push(ep);
            }
        }
    }

    for ep in &mut merged {
        ep.unique_ordered_targets();
    }
    merged
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod merge_tests;
