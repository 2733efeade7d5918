// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # dns-endpoints - DNS endpoint synthesis for Kubernetes
//!
//! Turns Kubernetes resources into a deduplicated list of desired DNS records
//! ("endpoints") for a downstream DNS provisioner.
//!
//! ## Overview
//!
//! Collectors ([`sources`]) watch resources and derive hostnames and targets from
//! annotations, field paths and templates. Their output is expanded into typed
//! endpoints ([`synthesis`]), merged ([`merge`]), combined across collectors with
//! default-target handling ([`aggregator`]) and finally deduplicated ([`dedup`]).
//!
//! ## Modules
//!
//! - [`endpoint`] - The endpoint record and its list operations
//! - [`record_type`] - Record type inference from target text
//! - [`annotations`] - Reading hostnames, targets, TTL and provider-specific pairs
//! - [`template`] - Hostname/target templates over an object context
//! - [`document`] - Dotted-path lookups into object documents
//! - [`synthesis`] - Expanding hostnames and targets into typed endpoints
//! - [`merge`] - Merging endpoints that share a name, type and set identifier
//! - [`assembly`] - Per-collector pipeline from objects to endpoints
//! - [`source`] - The [`source::Source`] trait
//! - [`sources`] - Kubernetes-backed collectors
//! - [`aggregator`] - Combining several sources with default targets
//! - [`dedup`] - Deduplicating wrapper source
//! - [`crd`] - The `DNSEndpoint` custom resource
//! - [`config`] - YAML configuration
//!
//! ## Example
//!
//! ```rust
//! use dns_endpoints::synthesis::endpoints_for_hostname;
//!
//! let endpoints = endpoints_for_hostname(
//!     "www.example.com",
//!     &["192.0.2.1".to_string(), "lb.example.net".to_string()],
//!     300,
//!     &Vec::new(),
//!     "",
//!     "ingress/default/web",
//! );
//! assert_eq!(endpoints.len(), 2);
//! ```

pub mod aggregator;
pub mod annotations;
pub mod assembly;
pub mod config;
pub mod constants;
pub mod crd;
pub mod dedup;
pub mod document;
pub mod endpoint;
pub mod errors;
pub mod labels;
pub mod merge;
pub mod metrics;
pub mod record_type;
pub mod source;
pub mod sources;
pub mod synthesis;
pub mod template;

#[cfg(test)]
pub(crate) mod test_support;
