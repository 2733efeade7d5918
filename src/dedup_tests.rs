// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the dedup wrapper.

use super::DedupSource;
use crate::endpoint::{Endpoint, Targets};
use crate::record_type::RecordType;
use crate::source::{EventHandler, Source};
use crate::test_support::MockSource;
use std::sync::Arc;

fn ep(name: &str, record_type: Option<RecordType>, targets: &[&str]) -> Endpoint {
    Endpoint {
        dns_name: name.to_string(),
        record_type,
        targets: Targets::new(targets.iter().copied()),
        ..Endpoint::default()
    }
}

async fn dedup(input: Vec<Endpoint>) -> Vec<Endpoint> {
    DedupSource::new(MockSource::returning(input))
        .endpoints()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_dedup_cases() {
    let a = Some(RecordType::A);
    let aaaa = Some(RecordType::AAAA);

    let cases: Vec<(&str, Vec<Endpoint>, Vec<Endpoint>)> = vec![
        (
            "one endpoint returns one endpoint",
            vec![ep("foo.example.org", None, &["1.2.3.4"])],
            vec![ep("foo.example.org", None, &["1.2.3.4"])],
        ),
        (
            "same name different targets are both kept",
            vec![
                ep("foo.example.org", None, &["1.2.3.4"]),
                ep("foo.example.org", None, &["4.5.6.7"]),
            ],
            vec![
                ep("foo.example.org", None, &["1.2.3.4"]),
                ep("foo.example.org", None, &["4.5.6.7"]),
            ],
        ),
        (
            "different names same target are both kept",
            vec![
                ep("foo.example.org", None, &["1.2.3.4"]),
                ep("bar.example.org", None, &["1.2.3.4"]),
            ],
            vec![
                ep("foo.example.org", None, &["1.2.3.4"]),
                ep("bar.example.org", None, &["1.2.3.4"]),
            ],
        ),
        (
            "exact duplicates collapse",
            vec![
                ep("foo.example.org", a, &["1.2.3.4"]),
                ep("foo.example.org", a, &["1.2.3.4"]),
            ],
            vec![ep("foo.example.org", a, &["1.2.3.4"])],
        ),
        (
            "different record types are kept",
            vec![
                ep("foo.example.org", a, &["1.2.3.4"]),
                ep("foo.example.org", aaaa, &["1.2.3.4"]),
            ],
            vec![
                ep("foo.example.org", a, &["1.2.3.4"]),
                ep("foo.example.org", aaaa, &["1.2.3.4"]),
            ],
        ),
        (
            "typed and untyped are kept",
            vec![
                ep("foo.example.org", a, &["1.2.3.4"]),
                ep("foo.example.org", None, &["1.2.3.4"]),
            ],
            vec![
                ep("foo.example.org", a, &["1.2.3.4"]),
                ep("foo.example.org", None, &["1.2.3.4"]),
            ],
        ),
        ("no endpoints", Vec::new(), Vec::new()),
        (
            "duplicate targets are removed",
            vec![ep("foo.example.org", a, &["1.2.3.4", "34.66.66.77", "34.66.66.77"])],
            vec![ep("foo.example.org", a, &["1.2.3.4", "34.66.66.77"])],
        ),
    ];

    for (title, input, expected) in cases {
        assert_eq!(dedup(input).await, expected, "{title}");
    }
}

#[tokio::test]
async fn test_dedup_keeps_target_order() {
    let result = dedup(vec![ep("foo.example.org", None, &["b.net", "a.net", "b.net"])]).await;
    assert_eq!(result[0].targets, Targets::new(["b.net", "a.net"]));
}

#[tokio::test]
async fn test_dedup_set_identifier_distinguishes_endpoints() {
    let eu = ep("foo.example.org", Some(RecordType::A), &["1.2.3.4"]).with_set_identifier("eu");
    let us = ep("foo.example.org", Some(RecordType::A), &["1.2.3.4"]).with_set_identifier("us");

    let result = dedup(vec![eu.clone(), us.clone(), eu.clone()]).await;

    assert_eq!(result, vec![eu, us]);
}

#[tokio::test]
async fn test_dedup_propagates_errors() {
    let err = DedupSource::new(MockSource::failing("boom"))
        .endpoints()
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "boom");
}

#[test]
fn test_dedup_forwards_event_handler() {
    let inner = MockSource::returning(Vec::new());
    let source = DedupSource::new(inner.clone());

    let handler: EventHandler = Arc::new(|| {});
    source.add_event_handler(handler);

    assert_eq!(inner.handler_count(), 1);
}
