// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for endpoint synthesis and collection.
//!
//! This module provides specialized error types for:
//! - Template compilation and execution
//! - Collector configuration (filters, resource identifiers)
//! - Endpoint construction
//! - Source failures surfaced through the aggregator
//!
//! Per-object problems (bad TTL annotation, CNAME conflicts, malformed host:target
//! pairs) are not errors: they are logged and the offending value is ignored.

use thiserror::Error;

/// Errors raised while compiling or executing a hostname/target template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The template text does not parse.
    ///
    /// Raised when a collector is constructed, so a bad template prevents the whole
    /// source from starting.
    #[error("Failed to parse template '{template}': {reason}")]
    Syntax {
        /// The offending template text
        template: String,
        /// Parser error message
        reason: String,
    },

    /// Rendering the template against an object failed.
    ///
    /// Typically caused by referencing a field the object does not have.
    #[error("Failed to apply template on {resource}: {reason}")]
    Execution {
        /// `kind namespace/name` of the object being rendered
        resource: String,
        /// Renderer error message
        reason: String,
    },
}

/// Configuration errors detected before any watch starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Annotation filter expression does not parse
    #[error("Invalid annotation filter '{expression}': {reason}")]
    InvalidAnnotationFilter {
        /// The filter expression
        expression: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// Resource identifier is not of the form `resource.version.group`
    #[error("Invalid resource identifier '{resource}': {reason}")]
    InvalidResource {
        /// The resource identifier
        resource: String,
        /// Explanation of what is invalid
        reason: String,
    },

    /// A template failed to compile
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Configuration file could not be read
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        /// Path of the configuration file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid YAML for the expected schema
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Configuration parses but is not usable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised while constructing an endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EndpointError {
    /// One label of the DNS name exceeds 63 characters
    #[error("label {label} in {dns_name} is longer than 63 characters")]
    LabelTooLong {
        /// The offending label
        label: String,
        /// The full DNS name
        dns_name: String,
    },
}

/// Errors returned by [`crate::source::Source::endpoints`].
///
/// The aggregator propagates these unchanged: a partial endpoint list could cause
/// unsafe deletions downstream, so any source failure fails the whole call.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Template execution failed for one of the source's objects
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Source configuration is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Kubernetes API call failed
    #[error("Kubernetes API error for {resource}: {source}")]
    Kube {
        /// Resource being accessed
        resource: String,
        /// Underlying client error
        #[source]
        source: kube::Error,
    },

    /// Resource could not be found through API discovery
    #[error("Failed to discover resource {resource}: {reason}")]
    Discovery {
        /// Resource identifier being discovered
        resource: String,
        /// Explanation of the failure
        reason: String,
    },

    /// Reflector cache never became ready
    #[error("Cache for {resource} failed to sync: {reason}")]
    CacheSync {
        /// Resource whose cache failed to sync
        resource: String,
        /// Explanation of the failure
        reason: String,
    },

    /// Any other failure, reported verbatim
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
