// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Views of watched objects used by the collectors.

use crate::template::TemplateContext;
use kube::api::{ApiResource, DynamicObject};
use kube::{Resource, ResourceExt};
use serde_json::{Map, Value};
use std::sync::Arc;

/// `kind/namespace/name` with a lowercase kind, the value of the `resource` label.
///
/// Cluster-scoped objects have an empty namespace segment.
#[must_use]
pub fn resource_label(kind: &str, namespace: &str, name: &str) -> String {
    format!("{}/{namespace}/{name}", kind.to_lowercase())
}

/// Orders store snapshots by namespace then name, so output does not depend on the
/// store's internal ordering.
pub(crate) fn sorted<K: Resource>(mut objects: Vec<Arc<K>>) -> Vec<Arc<K>> {
    objects.sort_by(|a, b| {
        (a.namespace(), a.name_any()).cmp(&(b.namespace(), b.name_any()))
    });
    objects
}

/// Builds the template context of a dynamic object.
///
/// `apiVersion` and `kind` come from `api_resource`, since listed objects do not always
/// carry type metadata. `spec` and `status` are `null` when the object has none.
#[must_use]
pub fn template_context(obj: &DynamicObject, api_resource: &ApiResource) -> TemplateContext {
    let metadata = serde_json::to_value(&obj.metadata).unwrap_or_default();

    let mut document = Map::new();
    document.insert("apiVersion".to_string(), Value::String(api_resource.api_version.clone()));
    document.insert("kind".to_string(), Value::String(api_resource.kind.clone()));
    document.insert("metadata".to_string(), metadata.clone());
    if let Value::Object(data) = &obj.data {
        for (key, value) in data {
            document.insert(key.clone(), value.clone());
        }
    }

    TemplateContext {
        name: obj.name_any(),
        namespace: obj.namespace().unwrap_or_default(),
        kind: api_resource.kind.clone(),
        api_version: api_resource.api_version.clone(),
        labels: obj.labels().clone(),
        annotations: obj.annotations().clone(),
        metadata,
        spec: obj.data.get("spec").cloned().unwrap_or_default(),
        status: obj.data.get("status").cloned().unwrap_or_default(),
        object: Value::Object(document),
    }
}

#[cfg(test)]
#[path = "object_tests.rs"]
mod object_tests;
