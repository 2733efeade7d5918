// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Annotation filter expressions.
//!
//! Collectors can be restricted to objects whose annotations match a filter written in
//! Kubernetes label-selector syntax:
//!
//! ```text
//! kubernetes.io/ingress.class=nginx
//! team in (a, b), !legacy
//! env!=prod, owner
//! ```
//!
//! Requirements are comma-separated and all must hold.

use crate::errors::ConfigError;
use std::collections::{BTreeMap, BTreeSet};

/// One requirement of a filter.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Requirement {
    Equals(String, String),
    NotEquals(String, String),
    In(String, BTreeSet<String>),
    NotIn(String, BTreeSet<String>),
    Exists(String),
    DoesNotExist(String),
}

impl Requirement {
    fn matches(&self, annotations: &BTreeMap<String, String>) -> bool {
        match self {
            Self::Equals(key, value) => annotations.get(key) == Some(value),
            Self::NotEquals(key, value) => annotations.get(key) != Some(value),
            Self::In(key, values) => annotations.get(key).is_some_and(|v| values.contains(v)),
            Self::NotIn(key, values) => annotations.get(key).is_none_or(|v| !values.contains(v)),
            Self::Exists(key) => annotations.contains_key(key),
            Self::DoesNotExist(key) => !annotations.contains_key(key),
        }
    }
}

/// Parsed annotation filter; the empty filter matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnnotationFilter {
    requirements: Vec<Requirement>,
}

impl AnnotationFilter {
    /// Parses a filter expression.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAnnotationFilter`] when the expression is malformed
    /// (empty key, unbalanced parentheses, missing value list).
    pub fn parse(expression: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidAnnotationFilter {
            expression: expression.to_string(),
            reason: reason.to_string(),
        };

        let mut requirements = Vec::new();
        for clause in split_clauses(expression).map_err(invalid)? {
            let clause = clause.trim();
            if clause.is_empty() {
                if expression.trim().is_empty() {
                    continue;
                }
                return Err(invalid("empty requirement"));
            }
            requirements.push(parse_requirement(clause).map_err(invalid)?);
        }

        Ok(Self { requirements })
    }

    /// Whether the filter has no requirements and so matches every object.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Whether every requirement holds for `annotations`.
    #[must_use]
    pub fn matches(&self, annotations: &BTreeMap<String, String>) -> bool {
        self.requirements.iter().all(|r| r.matches(annotations))
    }
}

/// Splits on commas that are not inside a `( ... )` value list.
fn split_clauses(expression: &str) -> Result<Vec<&str>, &'static str> {
    let mut clauses = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in expression.char_indices() {
        match c {
            '(' => {
                if depth > 0 {
                    return Err("nested parentheses");
                }
                depth += 1;
            }
            ')' => {
                if depth == 0 {
                    return Err("unbalanced parentheses");
                }
                depth -= 1;
            }
            ',' if depth == 0 => {
                clauses.push(&expression[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err("unterminated value list");
    }
    clauses.push(&expression[start..]);
    Ok(clauses)
}

fn parse_requirement(clause: &str) -> Result<Requirement, &'static str> {
    if let Some(key) = clause.strip_prefix('!') {
        return Ok(Requirement::DoesNotExist(parse_key(key)?));
    }

    if let Some((key, value)) = clause.split_once("!=") {
        return Ok(Requirement::NotEquals(parse_key(key)?, value.trim().to_string()));
    }
    if let Some((key, value)) = clause.split_once("==") {
        return Ok(Requirement::Equals(parse_key(key)?, value.trim().to_string()));
    }
    if let Some((key, value)) = clause.split_once('=') {
        return Ok(Requirement::Equals(parse_key(key)?, value.trim().to_string()));
    }

    if let Some(open) = clause.find('(') {
        let head = clause[..open].trim();
        let list = clause[open + 1..]
            .strip_suffix(')')
            .ok_or("trailing characters after value list")?;
        let values: BTreeSet<String> = list
            .split(',')
            .map(|v| v.trim().to_string())
            .collect();

        let (key, operator) = head.rsplit_once(char::is_whitespace).ok_or("missing operator")?;
        return match operator {
            "in" => Ok(Requirement::In(parse_key(key)?, values)),
            "notin" => Ok(Requirement::NotIn(parse_key(key)?, values)),
            _ => Err("unknown set operator"),
        };
    }

    Ok(Requirement::Exists(parse_key(clause)?))
}

fn parse_key(key: &str) -> Result<String, &'static str> {
    let key = key.trim();
    if key.is_empty() {
        return Err("empty key");
    }
    if key.contains(char::is_whitespace) {
        return Err("key must not contain whitespace");
    }
    Ok(key.to_string())
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod filter_tests;
