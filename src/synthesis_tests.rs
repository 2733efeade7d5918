// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for endpoint synthesis.

use super::*;
use crate::endpoint::{ProviderSpecificProperty, Targets};

fn targets(ep: &Endpoint) -> Vec<&str> {
    ep.targets.iter().map(String::as_str).collect()
}

// ============================================================================
// Cross Product
// ============================================================================

#[test]
fn test_single_host_single_target() {
    let endpoints = endpoints_for_hosts_and_targets(&["a.com"], &["1.2.3.4"]);

    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].dns_name, "a.com");
    assert_eq!(endpoints[0].record_type, Some(RecordType::A));
    assert_eq!(targets(&endpoints[0]), vec!["1.2.3.4"]);
}

#[test]
fn test_mixed_targets_yield_one_endpoint_per_type() {
    // IPs and hostnames together produce both address and CNAME endpoints for the
    // same name. This is observed behaviour, kept as-is.
    let endpoints = endpoints_for_hosts_and_targets(&["a.com"], &["b.com", "2001:db8::1", "1.2.3.4"]);

    let summary: Vec<_> = endpoints
        .iter()
        .map(|ep| (ep.dns_name.as_str(), ep.record_type, targets(ep)))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("a.com", Some(RecordType::A), vec!["1.2.3.4"]),
            ("a.com", Some(RecordType::AAAA), vec!["2001:db8::1"]),
            ("a.com", Some(RecordType::CNAME), vec!["b.com"]),
        ]
    );
}

#[test]
fn test_empty_inputs_yield_nothing() {
    let none: [&str; 0] = [];
    assert!(endpoints_for_hosts_and_targets(&none, &["1.2.3.4"]).is_empty());
    assert!(endpoints_for_hosts_and_targets(&["a.com"], &none).is_empty());
}

#[test]
fn test_order_and_duplicates_do_not_matter() {
    let a = endpoints_for_hosts_and_targets(
        &["b.com", "a.com", "b.com"],
        &["10.0.0.2", "10.0.0.1", "10.0.0.2", "::1"],
    );
    let b = endpoints_for_hosts_and_targets(&["a.com", "b.com"], &["::1", "10.0.0.1", "10.0.0.2"]);

    assert_eq!(a, b);
    assert_eq!(a.len(), 4);
    assert_eq!(a[0].dns_name, "a.com");
    assert_eq!(targets(&a[0]), vec!["10.0.0.1", "10.0.0.2"]);
    assert_eq!(a[1].record_type, Some(RecordType::AAAA));
    assert_eq!(a[2].dns_name, "b.com");
}

#[test]
fn test_cname_only_targets_never_get_address_records() {
    let endpoints = endpoints_for_hosts_and_targets(&["a.com"], &["lb1.example.net", "lb2.example.net"]);

    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].record_type, Some(RecordType::CNAME));
    assert_eq!(targets(&endpoints[0]), vec!["lb1.example.net", "lb2.example.net"]);
}

#[test]
fn test_trailing_dots_are_removed_before_classification() {
    let cases: [(&[&str], Vec<(Option<RecordType>, Vec<&str>)>); 4] = [
        (&["1.2.3.4."], vec![(Some(RecordType::A), vec!["1.2.3.4"])]),
        (&["b.com", "b.com."], vec![(Some(RecordType::CNAME), vec!["b.com"])]),
        (&[" 2001:db8::1 ", "."], vec![(Some(RecordType::AAAA), vec!["2001:db8::1"])]),
        (
            &["10.0.0.1.", "10.0.0.1", "lb.example.net."],
            vec![
                (Some(RecordType::A), vec!["10.0.0.1"]),
                (Some(RecordType::CNAME), vec!["lb.example.net"]),
            ],
        ),
    ];

    for (input, expected) in cases {
        let endpoints = endpoints_for_hosts_and_targets(&["a.com"], input);
        let got: Vec<_> = endpoints.iter().map(|ep| (ep.record_type, targets(ep))).collect();
        assert_eq!(got, expected, "targets {input:?}");
    }
}

#[test]
fn test_long_label_hostname_is_skipped() {
    let long = format!("{}.example.com", "x".repeat(64));
    let endpoints = endpoints_for_hosts_and_targets(&[long.as_str(), "ok.example.com"], &["1.2.3.4"]);

    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].dns_name, "ok.example.com");
}

// ============================================================================
// Host:Target Pairs
// ============================================================================

#[test]
fn test_pairs_split_on_first_colon() {
    let endpoints = endpoints_for_host_target_pairs(
        &["a.example.com:2001:db8::1", "b.example.com: 10.0.0.1 ", "c.example.com:lb.example.net."],
        "ConfigMap default/web",
    );

    let summary: Vec<_> = endpoints
        .iter()
        .map(|ep| (ep.dns_name.as_str(), ep.record_type, targets(ep)))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("a.example.com", Some(RecordType::AAAA), vec!["2001:db8::1"]),
            ("b.example.com", Some(RecordType::A), vec!["10.0.0.1"]),
            ("c.example.com", Some(RecordType::CNAME), vec!["lb.example.net"]),
        ]
    );
}

#[test]
fn test_pairs_malformed_are_skipped() {
    let (endpoints, logs) = crate::test_support::capture_logs(|| {
        endpoints_for_host_target_pairs(
            &["no-separator", ":10.0.0.1", "a.example.com:", "  :  ", "ok.example.com:10.0.0.1"],
            "ConfigMap default/web",
        )
    });

    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].dns_name, "ok.example.com");

    let skipped = crate::test_support::at_level(&logs, tracing::Level::DEBUG);
    assert_eq!(skipped.len(), 4);
    assert!(skipped.iter().all(|e| e.text.contains("ConfigMap default/web")));
}

#[test]
fn test_pairs_are_merged() {
    let endpoints = endpoints_for_host_target_pairs(
        &["a.example.com:10.0.0.2", "a.example.com:10.0.0.1", "a.example.com:10.0.0.2"],
        "ConfigMap default/web",
    );

    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].targets, Targets::new(["10.0.0.1", "10.0.0.2"]));
}

// ============================================================================
// Per-Hostname Variant
// ============================================================================

#[test]
fn test_endpoints_for_hostname_attaches_metadata() {
    let ps = vec![ProviderSpecificProperty::new("aws/weight", "10")];
    let endpoints = endpoints_for_hostname(
        "a.example.com",
        &["lb.example.net", "10.0.0.2", "10.0.0.1"],
        300,
        &ps,
        "blue",
        "crd/default/web",
    );

    assert_eq!(endpoints.len(), 2);
    assert_eq!(endpoints[0].record_type, Some(RecordType::A));
    assert_eq!(targets(&endpoints[0]), vec!["10.0.0.2", "10.0.0.1"]);
    assert_eq!(endpoints[1].record_type, Some(RecordType::CNAME));

    for ep in &endpoints {
        assert_eq!(ep.record_ttl, 300);
        assert_eq!(ep.set_identifier, "blue");
        assert_eq!(ep.provider_specific, ps);
        assert_eq!(ep.labels.get("resource").map(String::as_str), Some("crd/default/web"));
    }
}

#[test]
fn test_endpoints_for_hostname_without_resource_has_no_label() {
    let endpoints = endpoints_for_hostname("a.example.com", &["::1"], 0, &Vec::new(), "", "");

    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].record_type, Some(RecordType::AAAA));
    assert!(endpoints[0].labels.is_empty());
}

#[test]
fn test_endpoints_for_hostname_normalises_targets() {
    let endpoints = endpoints_for_hostname(
        "a.example.com",
        &["1.2.3.4.", "lb.example.net", "lb.example.net."],
        0,
        &Vec::new(),
        "",
        "",
    );

    let got: Vec<_> = endpoints.iter().map(|ep| (ep.record_type, targets(ep))).collect();
    assert_eq!(
        got,
        vec![
            (Some(RecordType::A), vec!["1.2.3.4"]),
            (Some(RecordType::CNAME), vec!["lb.example.net"]),
        ]
    );
}

#[test]
fn test_pairs_with_trailing_dot_ip_are_address_records() {
    let endpoints = endpoints_for_host_target_pairs(&["a.com:1.2.3.4."], "ConfigMap default/web");

    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].record_type, Some(RecordType::A));
    assert_eq!(targets(&endpoints[0]), vec!["1.2.3.4"]);
}
