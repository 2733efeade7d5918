// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! A [`Source`] wrapper removing duplicate endpoints.

use crate::endpoint::{Endpoint, EndpointKey, Targets};
use crate::errors::SourceError;
use crate::source::{EventHandler, Source};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Removes duplicate targets within an endpoint, then duplicate endpoints.
///
/// Two endpoints are duplicates when name, record type, set identifier and targets are
/// all equal; the first one is kept. Endpoints differing only in targets are both kept.
pub struct DedupSource {
    inner: Arc<dyn Source>,
}

impl DedupSource {
    #[must_use]
    pub fn new(inner: Arc<dyn Source>) -> Self {
        Self { inner }
    }
}

/// [`EndpointKey`] extended with the target list.
#[derive(PartialEq, Eq, Hash)]
struct DedupKey {
    key: EndpointKey,
    targets: Vec<String>,
}

impl DedupKey {
    fn of(ep: &Endpoint) -> Self {
        Self {
            key: ep.key(),
            targets: ep.targets.0.clone(),
        }
    }
}

/// Drops repeated targets, keeping first-seen order.
fn dedup_targets(targets: &Targets) -> Targets {
    let mut seen = HashSet::new();
    Targets(
        targets
            .iter()
            .filter(|t| seen.insert(t.as_str()))
            .cloned()
            .collect(),
    )
}

#[async_trait::async_trait]
impl Source for DedupSource {
    async fn endpoints(&self) -> Result<Vec<Endpoint>, SourceError> {
        let endpoints = self.inner.endpoints().await?;
        let mut seen = HashSet::with_capacity(endpoints.len());
        let mut result = Vec::with_capacity(endpoints.len());

        for mut ep in endpoints {
            ep.targets = dedup_targets(&ep.targets);

            if seen.insert(DedupKey::of(&ep)) {
                result.push(ep);
            } else {
                debug!(endpoint = %ep, "Removing duplicate endpoint");
            }
        }

        Ok(result)
    }

    fn add_event_handler(&self, handler: EventHandler) {
        self.inner.add_event_handler(handler);
    }
}

#[cfg(test)]
#[path = "dedup_tests.rs"]
mod dedup_tests;
