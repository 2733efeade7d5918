// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Fan-in over many collectors.
//!
//! [`MultiSource`] queries its children in order and concatenates their endpoints. When
//! default targets are configured, endpoints that arrive without targets (or every
//! endpoint, when forced) are re-expanded with one endpoint per record type inferred
//! from the defaults.
//!
//! Endpoints are not merged across children; wrap the aggregator in
//! [`crate::dedup::DedupSource`] or call [`crate::merge::merge_endpoints`] for that.

use crate::constants::SOURCE_MULTI;
use crate::endpoint::{Endpoint, Targets};
use crate::errors::SourceError;
use crate::metrics;
use crate::source::{EventHandler, Source};
use crate::synthesis::group_by_type;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Aggregates endpoints of several sources.
pub struct MultiSource {
    children: Vec<Arc<dyn Source>>,
    default_targets: Vec<String>,
    force_default_targets: bool,
}

impl MultiSource {
    /// Creates an aggregator over `children`.
    ///
    /// # Arguments
    ///
    /// * `children` - Sources queried in order
    /// * `default_targets` - Targets given to endpoints that have none; empty disables
    ///   default-target processing
    /// * `force_default_targets` - Replace the targets of every endpoint, not only of
    ///   empty ones
    #[must_use]
    pub fn new(
        children: Vec<Arc<dyn Source>>,
        default_targets: Vec<String>,
        force_default_targets: bool,
    ) -> Self {
        Self {
            children,
            default_targets,
            force_default_targets,
        }
    }

    /// Applies default targets to one endpoint.
    fn apply_default_targets(&self, ep: Endpoint, out: &mut Vec<Endpoint>) {
        if !self.force_default_targets && !ep.targets.is_empty() {
            warn!(
                dns_name = %ep.dns_name,
                targets = %ep.targets,
                default_targets = %self.default_targets.join(","),
                "Source provided targets, ignoring default targets. Set forceDefaultTargets to override"
            );
            out.push(ep);
            return;
        }

        for (record_type, group) in group_by_type(self.default_targets.iter().map(String::as_str)) {
            let mut expanded = ep.clone();
            expanded.record_type = Some(record_type);
            expanded.targets = Targets::new(group);
            out.push(expanded);
        }
    }
}

#[async_trait::async_trait]
impl Source for MultiSource {
    async fn endpoints(&self) -> Result<Vec<Endpoint>, SourceError> {
        let start = Instant::now();
        let mut result = Vec::new();

        for child in &self.children {
            let endpoints = match child.endpoints().await {
                Ok(endpoints) => endpoints,
                Err(e) => {
                    metrics::record_source_error(SOURCE_MULTI);
                    return Err(e);
                }
            };

            if self.default_targets.is_empty() {
                result.extend(endpoints);
                continue;
            }

            for ep in endpoints {
                self.apply_default_targets(ep, &mut result);
            }
        }

        debug!(
            sources = self.children.len(),
            endpoints = result.len(),
            "Aggregated endpoints"
        );
        metrics::record_aggregation(SOURCE_MULTI, result.len(), start.elapsed());
        Ok(result)
    }

    fn add_event_handler(&self, handler: EventHandler) {
        for child in &self.children {
            child.add_event_handler(Arc::clone(&handler));
        }
    }
}

#[cfg(test)]
#[path = "aggregator_tests.rs"]
mod aggregator_tests;
