// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Collector over arbitrary resources.
//!
//! Resources are named `resource.version.group`, or `resource.version` for the core
//! group (`configmaps.v1`, `certificates.v1.cert-manager.io`). Each one is resolved with
//! API discovery and watched as [`DynamicObject`]s.
//!
//! Per object, hostnames and targets come from the hostname/target annotations, from
//! the optional `hostnamePath`/`targetPath` fields, and from templates; see
//! [`crate::assembly`] for how they combine.

use super::object::{resource_label, sorted, template_context};
use super::watch::{spawn_reflector, wait_until_ready, watcher_config, Handlers, WatchTasks};
use super::SKIP_ANNOTATION_FILTER;
use crate::annotations::AnnotationFilter;
use crate::assembly::{AssemblyInput, EndpointAssembler};
use crate::config::UnstructuredConfig;
use crate::constants::SOURCE_UNSTRUCTURED;
use crate::document::Document;
use crate::endpoint::Endpoint;
use crate::errors::{ConfigError, SourceError};
use crate::metrics;
use crate::source::{EventHandler, Source};
use kube::api::{ApiResource, DynamicObject};
use kube::core::GroupVersion;
use kube::discovery::{self, verbs, ApiCapabilities, Scope};
use kube::runtime::reflector::{store::Writer, Store};
use kube::{Api, Client, ResourceExt};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

/// A parsed `resource.version.group` identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceId {
    /// Plural resource name, e.g. `configmaps`
    pub resource: String,
    pub version: String,
    /// API group; empty for the core group
    pub group: String,
}

impl ResourceId {
    /// Parses an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidResource`] if the resource or version is missing.
    pub fn parse(id: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidResource {
            resource: id.to_string(),
            reason: "expected resource.version.group (e.g. certificates.v1.cert-manager.io)"
                .to_string(),
        };

        let mut parts = id.trim().splitn(3, '.');
        let resource = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let version = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let group = parts.next().unwrap_or_default();

        Ok(Self {
            resource: resource.to_string(),
            version: version.to_string(),
            group: group.to_string(),
        })
    }

    #[must_use]
    pub fn group_version(&self) -> GroupVersion {
        GroupVersion::gv(&self.group, &self.version)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}.{}", self.resource, self.version)
        } else {
            write!(f, "{}.{}.{}", self.resource, self.version, self.group)
        }
    }
}

/// Resolves `id` against the cluster's discovery API.
async fn discover(client: &Client, id: &ResourceId) -> Result<(ApiResource, ApiCapabilities), SourceError> {
    let group = discovery::pinned_group(client, &id.group_version())
        .await
        .map_err(|e| SourceError::Discovery {
            resource: id.to_string(),
            reason: e.to_string(),
        })?;

    let (api_resource, capabilities) = group
        .versioned_resources(&id.version)
        .into_iter()
        .find(|(ar, _)| ar.plural == id.resource)
        .ok_or_else(|| SourceError::Discovery {
            resource: id.to_string(),
            reason: format!(
                "resource {} not found in {}",
                id.resource,
                id.group_version().api_version()
            ),
        })?;

    if !capabilities.supports_operation(verbs::WATCH) {
        return Err(SourceError::Discovery {
            resource: id.to_string(),
            reason: "resource does not support watch".to_string(),
        });
    }

    Ok((api_resource, capabilities))
}

struct WatchedResource {
    api_resource: ApiResource,
    store: Store<DynamicObject>,
}

/// Collector producing endpoints from arbitrary resources.
pub struct UnstructuredSource {
    assembler: EndpointAssembler,
    annotation_filter: AnnotationFilter,
    hostname_path: String,
    target_path: String,
    resources: Vec<WatchedResource>,
    handlers: Handlers,
    tasks: WatchTasks,
}

impl UnstructuredSource {
    /// Discovers the configured resources, starts their watches and waits for the
    /// initial cache sync.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] if the configuration is invalid, a resource cannot be
    /// discovered, or a cache does not sync.
    pub async fn new(client: Client, config: &UnstructuredConfig) -> Result<Self, SourceError> {
        let mut source = Self::from_stores(config, Vec::new())?;

        for id in &config.resources {
            let id = ResourceId::parse(id)?;
            let (api_resource, capabilities) = discover(&client, &id).await?;

            let api: Api<DynamicObject> =
                if matches!(capabilities.scope, Scope::Namespaced) && !config.namespace.is_empty() {
                    info!(
                        resource = %id,
                        namespace = %config.namespace,
                        "Unstructured source watching namespace-scoped resource"
                    );
                    Api::namespaced_with(client.clone(), &config.namespace, &api_resource)
                } else {
                    info!(resource = %id, "Unstructured source watching resource in all namespaces");
                    Api::all_with(client.clone(), &api_resource)
                };

            let writer = Writer::new(api_resource.clone());
            let store = writer.as_reader();
            source.tasks.push(spawn_reflector(
                api,
                watcher_config(&config.label_selector),
                writer,
                source.handlers.clone(),
                id.to_string(),
            ));

            wait_until_ready(&store, &id.to_string()).await?;
            source.resources.push(WatchedResource { api_resource, store });
        }

        Ok(source)
    }

    /// Builds a collector over already-populated stores, without any watch.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a template or the annotation filter is invalid.
    pub fn from_stores(
        config: &UnstructuredConfig,
        stores: Vec<(ApiResource, Store<DynamicObject>)>,
    ) -> Result<Self, ConfigError> {
        let assembler = EndpointAssembler::new(
            SOURCE_UNSTRUCTURED,
            &config.fqdn_template,
            &config.target_template,
            &config.host_target_template,
            config.combine_mode(),
        )?;

        Ok(Self {
            assembler,
            annotation_filter: AnnotationFilter::parse(&config.annotation_filter)?,
            hostname_path: config.hostname_path.clone(),
            target_path: config.target_path.clone(),
            resources: stores
                .into_iter()
                .map(|(api_resource, store)| WatchedResource { api_resource, store })
                .collect(),
            handlers: Handlers::default(),
            tasks: WatchTasks::default(),
        })
    }

    fn assembly_input(&self, obj: &DynamicObject, api_resource: &ApiResource) -> AssemblyInput {
        let context = template_context(obj, api_resource);
        let document = Document::new(&context.object);

        let hostnames = if self.hostname_path.is_empty() {
            Vec::new()
        } else {
            document.strings(&self.hostname_path)
        };
        let targets = if self.target_path.is_empty() {
            Vec::new()
        } else {
            document.strings(&self.target_path)
        };

        AssemblyInput {
            resource: resource_label(&context.kind, &context.namespace, &context.name),
            hostnames,
            targets,
            context,
        }
    }
}

#[async_trait::async_trait]
impl Source for UnstructuredSource {
    async fn endpoints(&self) -> Result<Vec<Endpoint>, SourceError> {
        let start = Instant::now();
        let mut inputs = Vec::new();

        for watched in &self.resources {
            for obj in sorted(watched.store.state()) {
                if !self.annotation_filter.matches(obj.annotations()) {
                    debug!(
                        kind = %watched.api_resource.kind,
                        namespace = ?obj.namespace(),
                        name = %obj.name_any(),
                        "Skipping object not matching annotation filter"
                    );
                    metrics::record_object_skipped(SOURCE_UNSTRUCTURED, SKIP_ANNOTATION_FILTER);
                    continue;
                }
                inputs.push(self.assembly_input(&obj, &watched.api_resource));
            }
        }

        let endpoints = match self.assembler.assemble(inputs) {
            Ok(endpoints) => endpoints,
            Err(e) => {
                metrics::record_source_error(SOURCE_UNSTRUCTURED);
                return Err(e.into());
            }
        };

        metrics::record_aggregation(SOURCE_UNSTRUCTURED, endpoints.len(), start.elapsed());
        Ok(endpoints)
    }

    fn add_event_handler(&self, handler: EventHandler) {
        self.handlers.add(handler);
    }
}

#[cfg(test)]
#[path = "unstructured_tests.rs"]
mod unstructured_tests;
