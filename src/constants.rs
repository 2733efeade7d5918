// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the endpoint engine.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Annotation and label keys live in [`crate::labels`].

// ============================================================================
// API Constants
// ============================================================================

/// API group for the `DNSEndpoint` CRD
pub const API_GROUP: &str = "dns-endpoints.io";

/// API version for the `DNSEndpoint` CRD
pub const API_VERSION: &str = "v1alpha1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "dns-endpoints.io/v1alpha1";

/// Kind name for `DNSEndpoint` resource
pub const KIND_DNS_ENDPOINT: &str = "DNSEndpoint";

/// Prefix used in the `resource` label of endpoints produced from `DNSEndpoint` objects
pub const CRD_RESOURCE_PREFIX: &str = "crd";

// ============================================================================
// DNS Constants
// ============================================================================

/// Smallest TTL accepted from the TTL annotation (seconds)
pub const TTL_MINIMUM_SECS: i64 = 1;

/// Largest TTL accepted from the TTL annotation (seconds, max 32-bit signed)
pub const TTL_MAXIMUM_SECS: i64 = i32::MAX as i64;

/// Maximum length of a single DNS label (RFC 1035)
pub const DNS_LABEL_MAX_LENGTH: usize = 63;

/// Separator used by host:target pair templates
pub const HOST_TARGET_SEPARATOR: char = ':';

// ============================================================================
// Source Type Names
// ============================================================================

/// Configuration name of the unstructured resource source
pub const SOURCE_UNSTRUCTURED: &str = "unstructured";

/// Configuration name of the `DNSEndpoint` CRD source
pub const SOURCE_CRD: &str = "crd";

/// Source name reported by the multi-source aggregator
pub const SOURCE_MULTI: &str = "multi";

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default path of the YAML configuration file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/dns-endpoints/config.yaml";

/// Environment variable overriding the configuration file path
pub const CONFIG_PATH_ENV: &str = "DNS_ENDPOINTS_CONFIG";

/// Minimum delay between two recomputations triggered by watch events
pub const EVENT_DEBOUNCE_MILLIS: u64 = 500;

/// Delay before retrying after an aggregation error
pub const ERROR_RETRY_DURATION_SECS: u64 = 30;

/// Maximum time a collector waits for its initial cache sync
pub const CACHE_SYNC_TIMEOUT_SECS: u64 = 60;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Port for Prometheus metrics HTTP server
pub const METRICS_SERVER_PORT: u16 = 8080;

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Bind address for metrics HTTP server
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0";
