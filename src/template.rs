// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Hostname and target templates.
//!
//! Templates are Handlebars text rendered against a [`TemplateContext`] built from one
//! watched object. The rendered output is a comma-separated list; [`Template::execute`]
//! splits and normalises it.
//!
//! Rendering runs in strict mode, so referencing a field the object does not have is an
//! execution error rather than an empty string. HTML escaping is disabled.
//!
//! # Helpers
//!
//! | helper       | arguments              | result                                 |
//! |--------------|------------------------|----------------------------------------|
//! | `contains`   | `s substr`             | whether `s` contains `substr`          |
//! | `trimPrefix` | `s prefix`             | `s` without a leading `prefix`         |
//! | `trimSuffix` | `s suffix`             | `s` without a trailing `suffix`        |
//! | `trim`       | `s`                    | `s` without surrounding whitespace     |
//! | `toLower`    | `s`                    | lowercase `s`                          |
//! | `replace`    | `old new target`       | `target` with every `old` as `new`     |
//! | `isIPv4`     | `s`                    | whether `s` is an IPv4 address         |
//! | `isIPv6`     | `s`                    | whether `s` is an IPv6 address         |
//! | `hasKey`     | `map key`              | whether `map` has `key`, even if empty |
//! | `fromJson`   | `s`                    | `s` decoded as JSON, `null` if invalid |
//!
//! # Example
//!
//! ```
//! use dns_endpoints::template::{Template, TemplateContext};
//!
//! let template = Template::compile("{{name}}.{{namespace}}.example.com.")
//!     .unwrap()
//!     .unwrap();
//! let context = TemplateContext {
//!     name: "web".into(),
//!     namespace: "default".into(),
//!     kind: "ConfigMap".into(),
//!     ..TemplateContext::default()
//! };
//!
//! assert_eq!(template.execute(&context).unwrap(), vec!["web.default.example.com"]);
//! ```

use crate::endpoint::Endpoint;
use crate::errors::TemplateError;
use handlebars::{handlebars_helper, no_escape, Handlebars};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::net::{Ipv4Addr, Ipv6Addr};

const TEMPLATE_NAME: &str = "endpoint";

handlebars_helper!(contains: |s: str, substr: str| s.contains(substr));
handlebars_helper!(trim_prefix: |s: str, prefix: str| s.strip_prefix(prefix).unwrap_or(s).to_string());
handlebars_helper!(trim_suffix: |s: str, suffix: str| s.strip_suffix(suffix).unwrap_or(s).to_string());
handlebars_helper!(trim: |s: str| s.trim().to_string());
handlebars_helper!(to_lower: |s: str| s.to_lowercase());
handlebars_helper!(replace: |old: str, new: str, target: str| target.replace(old, new));
handlebars_helper!(is_ipv4: |s: str| s.parse::<Ipv4Addr>().is_ok());
handlebars_helper!(is_ipv6: |s: str| s.parse::<Ipv6Addr>().is_ok());
handlebars_helper!(has_key: |map: object, key: str| map.contains_key(key));
handlebars_helper!(from_json: |s: str| serde_json::from_str::<Value>(s).unwrap_or(Value::Null));

/// Data a template is rendered against.
///
/// Field names are the ones templates use: `{{name}}`, `{{spec.host}}`,
/// `{{annotations.[example.com/key]}}`, `{{object.data.entries}}`.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateContext {
    pub name: String,
    pub namespace: String,
    pub kind: String,
    pub api_version: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub metadata: Value,
    pub spec: Value,
    pub status: Value,
    /// The whole object document
    pub object: Value,
}

impl TemplateContext {
    /// `kind namespace/name`, as used in execution errors.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} {}/{}", self.kind, self.namespace, self.name)
    }
}

/// A compiled template, reused for every object of a collector.
#[derive(Clone, Debug)]
pub struct Template {
    text: String,
    registry: Handlebars<'static>,
}

impl Template {
    /// Compiles template text.
    ///
    /// # Returns
    ///
    /// `None` for empty text (no template configured), the compiled template otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Syntax`] if the text does not parse.
    pub fn compile(text: &str) -> Result<Option<Self>, TemplateError> {
        if text.is_empty() {
            return Ok(None);
        }

        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(no_escape);
        registry.register_helper("contains", Box::new(contains));
        registry.register_helper("trimPrefix", Box::new(trim_prefix));
        registry.register_helper("trimSuffix", Box::new(trim_suffix));
        registry.register_helper("trim", Box::new(trim));
        registry.register_helper("toLower", Box::new(to_lower));
        registry.register_helper("replace", Box::new(replace));
        registry.register_helper("isIPv4", Box::new(is_ipv4));
        registry.register_helper("isIPv6", Box::new(is_ipv6));
        registry.register_helper("hasKey", Box::new(has_key));
        registry.register_helper("fromJson", Box::new(from_json));

        registry
            .register_template_string(TEMPLATE_NAME, text)
            .map_err(|e| TemplateError::Syntax {
                template: text.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Some(Self {
            text: text.to_string(),
            registry,
        }))
    }

    /// The template source text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Renders the template and returns the sorted, unique, non-empty entries.
    ///
    /// The output is split on commas; each entry is trimmed and loses one trailing `.`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Execution`] naming the object when rendering fails.
    pub fn execute(&self, context: &TemplateContext) -> Result<Vec<String>, TemplateError> {
        let rendered = self
            .registry
            .render(TEMPLATE_NAME, context)
            .map_err(|e| TemplateError::Execution {
                resource: context.describe(),
                reason: e.to_string(),
            })?;

        let entries: BTreeSet<String> = rendered
            .split(',')
            .map(str::trim)
            .map(|s| s.strip_suffix('.').unwrap_or(s))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Ok(entries.into_iter().collect())
    }
}

/// How templated endpoints combine with annotation-derived ones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CombineMode {
    /// Templated endpoints are used only when there are no annotation endpoints
    #[default]
    Replace,
    /// Templated endpoints are appended to annotation endpoints
    Combine,
}

impl CombineMode {
    #[must_use]
    pub fn from_combine_flag(combine: bool) -> Self {
        if combine {
            Self::Combine
        } else {
            Self::Replace
        }
    }
}

/// Applies the combination policy between annotation and template endpoints.
///
/// `templated` only runs when its output can be used: never without a template, and not
/// in [`CombineMode::Replace`] when `endpoints` is non-empty.
///
/// # Errors
///
/// Propagates the error returned by `templated`.
pub fn combine_with_templated<F>(
    endpoints: Vec<Endpoint>,
    template: Option<&Template>,
    mode: CombineMode,
    templated: F,
) -> Result<Vec<Endpoint>, TemplateError>
where
    F: FnOnce(&Template) -> Result<Vec<Endpoint>, TemplateError>,
{
    let Some(template) = template else {
        return Ok(endpoints);
    };

    if mode == CombineMode::Replace && !endpoints.is_empty() {
        return Ok(endpoints);
    }

    let templated_endpoints = templated(template)?;

    Ok(match mode {
        CombineMode::Combine => {
            let mut combined = endpoints;
            combined.extend(templated_endpoints);
            combined
        }
        CombineMode::Replace => templated_endpoints,
    })
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod template_tests;
