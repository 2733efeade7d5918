// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed access to untyped resource documents.
//!
//! Collectors that watch arbitrary resource kinds only have the JSON document of each
//! object. [`Document`] resolves dotted field paths against it and reports what it found
//! as a [`FieldValue`], so callers never index raw JSON.
//!
//! Path syntax: `.`-separated keys, each optionally followed by one or more `[n]` list
//! indexes, e.g. `spec.rules[0].host` or `status.loadBalancer.ingress[0].ip`.

use serde_json::{Map, Value};

/// Result of resolving a field path.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue<'a> {
    /// A scalar; numbers and booleans are rendered to their JSON text
    String(String),
    /// A list, in document order
    List(&'a [Value]),
    /// A nested object
    Map(&'a Map<String, Value>),
    /// The path does not resolve, or resolves to `null`
    Missing,
}

impl FieldValue<'_> {
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }
}

/// Read-only view over a resource's JSON document.
#[derive(Clone, Copy, Debug)]
pub struct Document<'a> {
    root: &'a Value,
}

impl<'a> Document<'a> {
    #[must_use]
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    /// The whole document.
    #[must_use]
    pub fn root(&self) -> &'a Value {
        self.root
    }

    /// Resolves `path` and classifies the value found there.
    ///
    /// An empty path resolves to the document root.
    #[must_use]
    pub fn get(&self, path: &str) -> FieldValue<'a> {
        match self.lookup(path) {
            None | Some(Value::Null) => FieldValue::Missing,
            Some(Value::String(s)) => FieldValue::String(s.clone()),
            Some(Value::Bool(b)) => FieldValue::String(b.to_string()),
            Some(Value::Number(n)) => FieldValue::String(n.to_string()),
            Some(Value::Array(items)) => FieldValue::List(items),
            Some(Value::Object(map)) => FieldValue::Map(map),
        }
    }

    /// Collects the string values found at `path`.
    ///
    /// A scalar is split on commas (the annotation convention); a list contributes each
    /// of its scalar elements. Entries are trimmed and empties dropped. Maps and missing
    /// fields yield nothing.
    #[must_use]
    pub fn strings(&self, path: &str) -> Vec<String> {
        match self.get(path) {
            FieldValue::String(s) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            FieldValue::List(items) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    Value::Bool(b) => Some(b.to_string()),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .collect(),
            FieldValue::Map(_) | FieldValue::Missing => Vec::new(),
        }
    }

    fn lookup(&self, path: &str) -> Option<&'a Value> {
        let mut current = self.root;
        if path.is_empty() {
            return Some(current);
        }

        for segment in path.split('.') {
            let (key, indexes) = match segment.find('[') {
                Some(pos) => segment.split_at(pos),
                None => (segment, ""),
            };

            if !key.is_empty() {
                current = current.as_object()?.get(key)?;
            }

            let mut rest = indexes;
            while let Some(stripped) = rest.strip_prefix('[') {
                let end = stripped.find(']')?;
                let index: usize = stripped[..end].parse().ok()?;
                current = current.as_array()?.get(index)?;
                rest = &stripped[end + 1..];
            }
            if !rest.is_empty() {
                return None;
            }
        }

        Some(current)
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod document_tests;
