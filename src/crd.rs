// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) for declarative endpoints.
//!
//! [`DNSEndpoint`] lets users list DNS endpoints directly instead of deriving them from
//! other resources. The CRD collector (`sources::crd`) turns each entry into endpoints.
//!
//! # Example
//!
//! ```yaml
//! apiVersion: dns-endpoints.io/v1alpha1
//! kind: DNSEndpoint
//! metadata:
//!   name: web
//!   namespace: default
//! spec:
//!   endpoints:
//!     - dnsName: www.example.com
//!       targets: ["192.0.2.10", "2001:db8::10"]
//!       recordTTL: 300
//!     - dnsName: legacy.example.com
//!       targets: ["lb.example.net"]
//!       setIdentifier: eu-west
//!       providerSpecific:
//!         - name: aws/weight
//!           value: "50"
//! ```
//!
//! # Example: Building a spec in Rust
//!
//! ```rust,no_run
//! use dns_endpoints::crd::{DNSEndpointSpec, EndpointEntry};
//!
//! let spec = DNSEndpointSpec {
//!     endpoints: vec![EndpointEntry {
//!         dns_name: "www.example.com".to_string(),
//!         targets: vec!["192.0.2.10".to_string()],
//!         record_ttl: Some(300),
//!         ..EndpointEntry::default()
//!     }],
//! };
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One provider-specific name/value pair.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProviderSpecificEntry {
    pub name: String,
    pub value: String,
}

/// One endpoint declared in a [`DNSEndpoint`].
///
/// The record type is inferred from the targets. An entry without targets is passed on
/// untyped, so configured default targets can fill it in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EndpointEntry {
    /// Owner name of the records (e.g., "www.example.com").
    pub dns_name: String,

    /// Record targets: IPv4 addresses, IPv6 addresses or hostnames.
    ///
    /// Targets must not end with a dot; an entry with such a target is ignored.
    #[serde(default)]
    pub targets: Vec<String>,

    /// Time To Live in seconds.
    #[serde(default, rename = "recordTTL", skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 0, max = 2_147_483_647))]
    pub record_ttl: Option<i64>,

    /// Distinguishes records sharing name and type, for weighted or geo routing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_identifier: Option<String>,

    /// Labels copied onto the produced endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    /// Provider-specific pairs, passed through unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_specific: Option<Vec<ProviderSpecificEntry>>,
}

/// `DNSEndpoint` declares a list of DNS endpoints.
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "dns-endpoints.io",
    version = "v1alpha1",
    kind = "DNSEndpoint",
    namespaced,
    shortname = "dnsep",
    doc = "DNSEndpoint declares DNS endpoints directly. Each entry becomes one endpoint per record type inferred from its targets."
)]
#[kube(status = "DNSEndpointStatus")]
#[serde(rename_all = "camelCase")]
pub struct DNSEndpointSpec {
    /// Endpoints to publish.
    #[serde(default)]
    pub endpoints: Vec<EndpointEntry>,
}

/// `DNSEndpoint` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DNSEndpointStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
