// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! YAML configuration of the binary.
//!
//! ```yaml
//! defaultTargets: ["192.0.2.1"]
//! forceDefaultTargets: false
//! metricsPort: 8080
//! sources:
//!   - type: unstructured
//!     resources: [configmaps.v1]
//!     annotationFilter: "dns-endpoints.io/enabled=true"
//!     fqdnTemplate: "{{name}}.{{namespace}}.example.com"
//!     targetTemplate: "{{object.data.ip}}"
//!   - type: crd
//!     namespace: dns
//! ```
//!
//! [`Config::validate`] compiles every template and filter, so errors surface at
//! startup instead of on the first watch event.

use crate::annotations::AnnotationFilter;
use crate::constants::METRICS_SERVER_PORT;
use crate::errors::ConfigError;
use crate::sources::unstructured::ResourceId;
use crate::template::{CombineMode, Template};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

fn default_metrics_port() -> u16 {
    METRICS_SERVER_PORT
}

/// Top-level configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Targets given to endpoints that arrive without any
    #[serde(default)]
    pub default_targets: Vec<String>,

    /// Replace the targets of every endpoint with the default targets
    #[serde(default)]
    pub force_default_targets: bool,

    /// Port of the Prometheus metrics server
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Collectors, queried in order
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_targets: Vec::new(),
            force_default_targets: false,
            metrics_port: METRICS_SERVER_PORT,
            sources: Vec::new(),
        }
    }
}

/// One collector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    Unstructured(UnstructuredConfig),
    Crd(CrdConfig),
}

impl SourceConfig {
    /// Collector name used in logs and metrics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unstructured(_) => crate::constants::SOURCE_UNSTRUCTURED,
            Self::Crd(_) => crate::constants::SOURCE_CRD,
        }
    }
}

/// Collector over arbitrary resources.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnstructuredConfig {
    /// Resources to watch, as `resource.version.group` (`configmaps.v1` for core)
    pub resources: Vec<String>,
    /// Namespace to watch; empty for all
    pub namespace: String,
    /// Label selector passed to the API server
    pub label_selector: String,
    /// Annotation filter expression
    pub annotation_filter: String,
    pub fqdn_template: String,
    pub target_template: String,
    pub host_target_template: String,
    /// Combine template endpoints with annotation endpoints instead of falling back
    pub combine_fqdn_annotation: bool,
    /// Dotted path to hostnames inside the object
    pub hostname_path: String,
    /// Dotted path to targets inside the object
    pub target_path: String,
}

impl UnstructuredConfig {
    #[must_use]
    pub fn combine_mode(&self) -> CombineMode {
        CombineMode::from_combine_flag(self.combine_fqdn_annotation)
    }
}

/// Collector over `DNSEndpoint` resources.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrdConfig {
    /// Namespace to watch; empty for all
    pub namespace: String,
    /// Label selector passed to the API server
    pub label_selector: String,
    /// Annotation filter expression
    pub annotation_filter: String,
}

impl Config {
    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, [`ConfigError::Parse`] if
    /// it is not valid YAML for the schema, or the first validation error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded configuration file");
        Self::from_yaml(&text)
    }

    /// Parses and validates YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] or the first validation error.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every collector can be constructed.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::Invalid("at least one source is required".to_string()));
        }

        if self.force_default_targets && self.default_targets.is_empty() {
            return Err(ConfigError::Invalid(
                "forceDefaultTargets requires defaultTargets".to_string(),
            ));
        }

        for source in &self.sources {
            match source {
                SourceConfig::Unstructured(config) => {
                    if config.resources.is_empty() {
                        return Err(ConfigError::Invalid(
                            "unstructured source requires at least one resource".to_string(),
                        ));
                    }
                    for resource in &config.resources {
                        ResourceId::parse(resource)?;
                    }
                    AnnotationFilter::parse(&config.annotation_filter)?;
                    Template::compile(&config.fqdn_template)?;
                    Template::compile(&config.target_template)?;
                    Template::compile(&config.host_target_template)?;
                }
                SourceConfig::Crd(config) => {
                    AnnotationFilter::parse(&config.annotation_filter)?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
