// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! End-to-end tests of the endpoint pipeline over in-memory reflector stores.
//!
//! Collectors -> `MultiSource` (default targets) -> `DedupSource`, exercised only
//! through the public API. No cluster is required.
//!
//! Run with: cargo test --test endpoint_pipeline

use dns_endpoints::aggregator::MultiSource;
use dns_endpoints::config::{Config, CrdConfig, SourceConfig, UnstructuredConfig};
use dns_endpoints::crd::{DNSEndpoint, DNSEndpointSpec, EndpointEntry};
use dns_endpoints::dedup::DedupSource;
use dns_endpoints::endpoint::{Endpoint, Targets};
use dns_endpoints::record_type::RecordType;
use dns_endpoints::source::Source;
use dns_endpoints::sources::crd::CrdSource;
use dns_endpoints::sources::unstructured::UnstructuredSource;
use kube::api::{ApiResource, DynamicObject};
use kube::core::GroupVersionKind;
use kube::runtime::reflector::{self, store::Writer};
use kube::runtime::watcher::Event;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

// ============================================================================
// Helper Functions
// ============================================================================

fn configmaps() -> ApiResource {
    ApiResource::from_gvk_with_plural(&GroupVersionKind::gvk("", "v1", "ConfigMap"), "configmaps")
}

fn annotated_configmap(name: &str, hostname: &str, target: &str) -> DynamicObject {
    let mut obj = DynamicObject::new(name, &configmaps())
        .within("default")
        .data(json!({ "data": {} }));
    obj.metadata.annotations = Some(BTreeMap::from([
        (
            "external-dns.alpha.kubernetes.io/hostname".to_string(),
            hostname.to_string(),
        ),
        (
            "external-dns.alpha.kubernetes.io/target".to_string(),
            target.to_string(),
        ),
    ]));
    obj
}

fn unstructured_source(objects: Vec<DynamicObject>) -> Arc<dyn Source> {
    let ar = configmaps();
    let mut writer = Writer::new(ar.clone());
    for obj in objects {
        writer.apply_watcher_event(&Event::Apply(obj));
    }
    Arc::new(
        UnstructuredSource::from_stores(&UnstructuredConfig::default(), vec![(ar, writer.as_reader())])
            .unwrap(),
    )
}

fn crd_source(entries: Vec<EndpointEntry>) -> Arc<dyn Source> {
    let mut obj = DNSEndpoint::new("records", DNSEndpointSpec { endpoints: entries });
    obj.metadata.namespace = Some("default".to_string());

    let (store, mut writer) = reflector::store();
    writer.apply_watcher_event(&Event::Apply(obj));
    Arc::new(CrdSource::from_store(&CrdConfig::default(), store).unwrap())
}

fn entry(dns_name: &str, targets: &[&str]) -> EndpointEntry {
    EndpointEntry {
        dns_name: dns_name.to_string(),
        targets: targets.iter().map(|t| (*t).to_string()).collect(),
        ..EndpointEntry::default()
    }
}

fn find<'a>(endpoints: &'a [Endpoint], dns_name: &str, record_type: RecordType) -> &'a Endpoint {
    endpoints
        .iter()
        .find(|ep| ep.dns_name == dns_name && ep.record_type == Some(record_type))
        .unwrap_or_else(|| panic!("no {record_type} endpoint for {dns_name} in {endpoints:?}"))
}

// ============================================================================
// Pipeline
// ============================================================================

#[tokio::test]
async fn test_pipeline_combines_dedups_and_applies_defaults() {
    let pipeline = DedupSource::new(Arc::new(MultiSource::new(
        vec![
            unstructured_source(vec![annotated_configmap("web", "www.example.com", "192.0.2.1")]),
            crd_source(vec![
                entry("www.example.com", &["192.0.2.1"]),
                entry("default.example.com", &[]),
            ]),
        ],
        vec!["192.0.2.10".to_string(), "lb.example.net".to_string()],
        false,
    )));

    let endpoints = pipeline.endpoints().await.unwrap();

    assert_eq!(endpoints.len(), 3, "got {endpoints:?}");

    let www = find(&endpoints, "www.example.com", RecordType::A);
    assert_eq!(www.targets, Targets::new(["192.0.2.1"]));
    assert_eq!(
        www.labels.get("resource").map(String::as_str),
        Some("configmap/default/web"),
        "the first source's endpoint is kept"
    );

    let default_a = find(&endpoints, "default.example.com", RecordType::A);
    assert_eq!(default_a.targets, Targets::new(["192.0.2.10"]));
    assert_eq!(
        default_a.labels.get("resource").map(String::as_str),
        Some("crd/default/records")
    );

    let default_cname = find(&endpoints, "default.example.com", RecordType::CNAME);
    assert_eq!(default_cname.targets, Targets::new(["lb.example.net"]));
}

#[tokio::test]
async fn test_pipeline_forced_defaults_replace_targets() {
    let pipeline = DedupSource::new(Arc::new(MultiSource::new(
        vec![unstructured_source(vec![
            annotated_configmap("a", "a.example.com", "192.0.2.1"),
            annotated_configmap("b", "b.example.com", "192.0.2.2"),
        ])],
        vec!["203.0.113.1".to_string()],
        true,
    )));

    let endpoints = pipeline.endpoints().await.unwrap();

    assert_eq!(endpoints.len(), 2);
    for ep in &endpoints {
        assert_eq!(ep.record_type, Some(RecordType::A));
        assert_eq!(ep.targets, Targets::new(["203.0.113.1"]));
    }
}

#[tokio::test]
async fn test_pipeline_serializes_endpoint_list() {
    let pipeline = DedupSource::new(Arc::new(MultiSource::new(
        vec![unstructured_source(vec![annotated_configmap(
            "web",
            "www.example.com",
            "192.0.2.1",
        )])],
        Vec::new(),
        false,
    )));

    let endpoints = pipeline.endpoints().await.unwrap();
    let value = serde_json::to_value(&endpoints).unwrap();

    assert_eq!(value[0]["dnsName"], json!("www.example.com"));
    assert_eq!(value[0]["recordType"], json!("A"));
    assert_eq!(value[0]["targets"], json!(["192.0.2.1"]));
    assert_eq!(value[0]["labels"]["resource"], json!("configmap/default/web"));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_configuration_drives_source_selection() {
    let config = Config::from_yaml(
        r"
defaultTargets: [192.0.2.10]
sources:
  - type: unstructured
    resources: [configmaps.v1]
    fqdnTemplate: '{{name}}.example.com'
  - type: crd
    namespace: apps
",
    )
    .unwrap();

    assert_eq!(config.default_targets, vec!["192.0.2.10".to_string()]);
    let names: Vec<_> = config.sources.iter().map(SourceConfig::name).collect();
    assert_eq!(names, vec!["unstructured", "crd"]);
}
