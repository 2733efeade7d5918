// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Collector over [`DNSEndpoint`] resources.
//!
//! Every entry of a `DNSEndpoint` spec becomes one endpoint per record type inferred
//! from its targets. Entries without targets are passed on untyped so the aggregator
//! can apply default targets. Entries with a target ending in `.` are skipped.

use super::object::{resource_label, sorted};
use super::watch::{spawn_reflector, wait_until_ready, watcher_config, Handlers, WatchTasks};
use super::{SKIP_ANNOTATION_FILTER, SKIP_ILLEGAL_TARGET};
use crate::annotations::AnnotationFilter;
use crate::config::CrdConfig;
use crate::constants::{CRD_RESOURCE_PREFIX, SOURCE_CRD};
use crate::crd::{DNSEndpoint, EndpointEntry};
use crate::endpoint::{Endpoint, ProviderSpecific, ProviderSpecificProperty};
use crate::errors::{ConfigError, SourceError};
use crate::labels::RESOURCE_LABEL_KEY;
use crate::merge::merge_endpoints;
use crate::metrics;
use crate::source::{EventHandler, Source};
use crate::synthesis::endpoints_for_hostname;
use kube::runtime::reflector::{self, Store};
use kube::{Api, Client, ResourceExt};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Collector producing endpoints from `DNSEndpoint` resources.
pub struct CrdSource {
    store: Store<DNSEndpoint>,
    annotation_filter: AnnotationFilter,
    handlers: Handlers,
    tasks: WatchTasks,
}

impl CrdSource {
    /// Starts watching `DNSEndpoint` resources and waits for the initial cache sync.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] if the annotation filter is invalid or the cache does
    /// not sync.
    pub async fn new(client: Client, config: &CrdConfig) -> Result<Self, SourceError> {
        let api: Api<DNSEndpoint> = if config.namespace.is_empty() {
            info!("CRD source watching DNSEndpoint resources in all namespaces");
            Api::all(client)
        } else {
            info!(namespace = %config.namespace, "CRD source watching DNSEndpoint resources");
            Api::namespaced(client, &config.namespace)
        };

        let (store, writer) = reflector::store();
        let mut source = Self::from_store(config, store)?;
        source.tasks.push(spawn_reflector(
            api,
            watcher_config(&config.label_selector),
            writer,
            source.handlers.clone(),
            SOURCE_CRD.to_string(),
        ));

        wait_until_ready(&source.store, SOURCE_CRD).await?;
        Ok(source)
    }

    /// Builds a collector over an already-populated store, without any watch.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAnnotationFilter`] if the filter does not parse.
    pub fn from_store(config: &CrdConfig, store: Store<DNSEndpoint>) -> Result<Self, ConfigError> {
        Ok(Self {
            store,
            annotation_filter: AnnotationFilter::parse(&config.annotation_filter)?,
            handlers: Handlers::default(),
            tasks: WatchTasks::default(),
        })
    }
}

fn provider_specific(entry: &EndpointEntry) -> ProviderSpecific {
    entry
        .provider_specific
        .iter()
        .flatten()
        .map(|p| ProviderSpecificProperty::new(p.name.as_str(), p.value.as_str()))
        .collect()
}

/// Endpoints of one spec entry; empty when the entry is skipped.
fn entry_endpoints(entry: &EndpointEntry, resource: &str) -> Vec<Endpoint> {
    let ttl = entry.record_ttl.unwrap_or_default();
    let set_identifier = entry.set_identifier.as_deref().unwrap_or_default();
    let provider_specific = provider_specific(entry);

    let mut endpoints = if entry.targets.is_empty() {
        debug!(
            resource = resource,
            dns_name = %entry.dns_name,
            "Endpoint has no targets, passing it through for default-target processing"
        );
        match Endpoint::try_new(&entry.dns_name, None, ttl, Vec::<String>::new()) {
            Ok(ep) => vec![ep
                .with_set_identifier(set_identifier)
                .with_provider_specific(provider_specific)
                .with_label(RESOURCE_LABEL_KEY, resource)],
            Err(e) => {
                error!(resource = resource, "{e}");
                Vec::new()
            }
        }
    } else if entry.targets.iter().any(|t| t.ends_with('.')) {
        warn!(
            resource = resource,
            dns_name = %entry.dns_name,
            targets = %entry.targets.join(";"),
            "Endpoint has an illegal target format: targets must not end with '.'"
        );
        metrics::record_object_skipped(SOURCE_CRD, SKIP_ILLEGAL_TARGET);
        Vec::new()
    } else {
        endpoints_for_hostname(
            &entry.dns_name,
            &entry.targets,
            ttl,
            &provider_specific,
            set_identifier,
            resource,
        )
    };

    // The resource label always wins over user labels.
    if let Some(labels) = &entry.labels {
        for ep in &mut endpoints {
            for (key, value) in labels {
                ep.labels.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
    }
    endpoints
}

#[async_trait::async_trait]
impl Source for CrdSource {
    async fn endpoints(&self) -> Result<Vec<Endpoint>, SourceError> {
        let start = Instant::now();
        let mut endpoints = Vec::new();

        for dns_endpoint in sorted(self.store.state()) {
            let namespace = dns_endpoint.namespace().unwrap_or_default();
            let name = dns_endpoint.name_any();

            if !self.annotation_filter.matches(dns_endpoint.annotations()) {
                debug!(namespace = %namespace, name = %name, "Skipping DNSEndpoint not matching annotation filter");
                metrics::record_object_skipped(SOURCE_CRD, SKIP_ANNOTATION_FILTER);
                continue;
            }

            let resource = resource_label(CRD_RESOURCE_PREFIX, &namespace, &name);
            for entry in &dns_endpoint.spec.endpoints {
                endpoints.extend(entry_endpoints(entry, &resource));
            }
        }

        let endpoints = merge_endpoints(endpoints);
        metrics::record_aggregation(SOURCE_CRD, endpoints.len(), start.elapsed());
        Ok(endpoints)
    }

    fn add_event_handler(&self, handler: EventHandler) {
        self.handlers.add(handler);
    }
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
