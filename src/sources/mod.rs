// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes-backed endpoint collectors.
//!
//! - [`unstructured`] - endpoints from arbitrary resources via annotations, field paths
//!   and templates
//! - [`crd`] - endpoints declared directly in `DNSEndpoint` resources
//!
//! Both keep a reflector store per watched resource and compute endpoints from the
//! store on every call, so [`Source::endpoints`] never touches the API server.

pub mod crd;
pub mod object;
pub mod unstructured;
pub(crate) mod watch;

use crate::config::SourceConfig;
use crate::errors::SourceError;
use crate::source::Source;
use kube::Client;
use std::sync::Arc;
use tracing::info;

/// Skip reason for objects excluded by the annotation filter.
pub const SKIP_ANNOTATION_FILTER: &str = "annotation_filter";

/// Skip reason for `DNSEndpoint` entries whose targets end with `.`.
pub const SKIP_ILLEGAL_TARGET: &str = "illegal_target";

/// Builds and starts the collector described by `config`.
///
/// Returns once the collector's caches have synced.
///
/// # Errors
///
/// Returns a [`SourceError`] if the configuration is invalid, a resource cannot be
/// discovered, or a cache does not sync.
pub async fn build_source(client: Client, config: &SourceConfig) -> Result<Arc<dyn Source>, SourceError> {
    info!(source = config.name(), "Starting source");

    let source: Arc<dyn Source> = match config {
        SourceConfig::Unstructured(cfg) => Arc::new(unstructured::UnstructuredSource::new(client, cfg).await?),
        SourceConfig::Crd(cfg) => Arc::new(crd::CrdSource::new(client, cfg).await?),
    };
    Ok(source)
}
