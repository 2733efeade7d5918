// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for structured document lookups.

use crate::document::{Document, FieldValue};
use serde_json::json;

fn sample() -> serde_json::Value {
    json!({
        "metadata": { "name": "web", "generation": 3 },
        "spec": {
            "hosts": ["a.example.com", " b.example.com ", "", 7],
            "host": "a.example.com, b.example.com",
            "enabled": true,
            "rules": [
                { "host": "rule0.example.com" },
                { "host": "rule1.example.com", "ports": [[80, 443]] }
            ],
            "nothing": null
        }
    })
}

#[test]
fn test_get_scalar_values() {
    let doc = sample();
    let doc = Document::new(&doc);

    assert_eq!(doc.get("metadata.name"), FieldValue::String("web".into()));
    assert_eq!(doc.get("metadata.generation"), FieldValue::String("3".into()));
    assert_eq!(doc.get("spec.enabled"), FieldValue::String("true".into()));
}

#[test]
fn test_get_indexed_paths() {
    let doc = sample();
    let doc = Document::new(&doc);

    assert_eq!(
        doc.get("spec.rules[1].host"),
        FieldValue::String("rule1.example.com".into())
    );
    assert_eq!(
        doc.get("spec.rules[1].ports[0][1]"),
        FieldValue::String("443".into())
    );
}

#[test]
fn test_get_containers() {
    let doc = sample();
    let doc = Document::new(&doc);

    assert!(matches!(doc.get("spec.rules"), FieldValue::List(items) if items.len() == 2));
    assert!(matches!(doc.get("metadata"), FieldValue::Map(map) if map.contains_key("name")));
    assert!(matches!(doc.get(""), FieldValue::Map(_)));
}

#[test]
fn test_get_missing() {
    let doc = sample();
    let doc = Document::new(&doc);

    for path in [
        "spec.absent",
        "spec.nothing",
        "spec.rules[5].host",
        "spec.rules[x]",
        "spec.rules[0",
        "metadata.name.deeper",
        "spec.host[0]",
    ] {
        assert!(doc.get(path).is_missing(), "path {path}");
    }
}

#[test]
fn test_strings_from_scalar_splits_commas() {
    let doc = sample();
    let doc = Document::new(&doc);

    assert_eq!(doc.strings("spec.host"), vec!["a.example.com", "b.example.com"]);
}

#[test]
fn test_strings_from_list() {
    let doc = sample();
    let doc = Document::new(&doc);

    assert_eq!(
        doc.strings("spec.hosts"),
        vec!["a.example.com", "b.example.com", "7"]
    );
}

#[test]
fn test_strings_from_map_or_missing_is_empty() {
    let doc = sample();
    let doc = Document::new(&doc);

    assert!(doc.strings("metadata").is_empty());
    assert!(doc.strings("spec.absent").is_empty());
}
