// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the endpoint engine.
//!
//! All metrics carry the namespace prefix `dns_endpoints_`.
//!
//! # Metrics Categories
//!
//! - **Source Metrics** - Endpoints produced and errors raised per source
//! - **Input Quality Metrics** - Objects skipped, invalid TTL annotations, CNAME conflicts
//! - **Performance Metrics** - Duration of endpoint aggregation
//!
//! # Example
//!
//! ```rust,no_run
//! use dns_endpoints::metrics::record_aggregation;
//!
//! record_aggregation("multi", 12, std::time::Duration::from_millis(3));
//! ```

use prometheus::{
    Counter, CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "dns_endpoints";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Source Metrics
// ============================================================================

/// Number of endpoints returned by the last successful call, per source
///
/// Labels:
/// - `source`: Source name (`unstructured`, `crd`, `multi`)
pub static SOURCE_ENDPOINTS: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_source_endpoints"),
        "Number of endpoints returned by the last successful call per source",
    );
    let gauge = GaugeVec::new(opts, &["source"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Total number of failed endpoint calls per source
///
/// Labels:
/// - `source`: Source name
pub static SOURCE_ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_source_errors_total"),
        "Total number of failed endpoint calls per source",
    );
    let counter = CounterVec::new(opts, &["source"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Input Quality Metrics
// ============================================================================

/// Total number of objects skipped by collectors
///
/// Labels:
/// - `source`: Source name
/// - `reason`: Why the object was skipped (`controller_mismatch`, `annotation_filter`,
///   `invalid_target`)
pub static OBJECTS_SKIPPED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_objects_skipped_total"),
        "Total number of objects skipped by collectors by source and reason",
    );
    let counter = CounterVec::new(opts, &["source", "reason"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of TTL annotations ignored because they were invalid or out of range
pub static INVALID_TTL_ANNOTATIONS_TOTAL: LazyLock<Counter> = LazyLock::new(|| {
    let counter = Counter::new(
        format!("{METRICS_NAMESPACE}_invalid_ttl_annotations_total"),
        "Total number of TTL annotations ignored because they were invalid",
    )
    .unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of conflicting CNAME candidates discarded during merge
pub static CNAME_CONFLICTS_TOTAL: LazyLock<Counter> = LazyLock::new(|| {
    let counter = Counter::new(
        format!("{METRICS_NAMESPACE}_cname_conflicts_total"),
        "Total number of conflicting CNAME candidates discarded during merge",
    )
    .unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Performance Metrics
// ============================================================================

/// Duration of endpoint aggregation in seconds
///
/// Labels:
/// - `source`: Source name
pub static AGGREGATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_aggregation_duration_seconds"),
        "Duration of endpoint aggregation in seconds by source",
    )
    .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]);
    let histogram = HistogramVec::new(opts, &["source"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Recording Helpers
// ============================================================================

/// Record a successful endpoint call
///
/// # Arguments
/// * `source` - Source name
/// * `endpoints` - Number of endpoints returned
/// * `duration` - Time spent producing them
pub fn record_aggregation(source: &str, endpoints: usize, duration: Duration) {
    #[allow(clippy::cast_precision_loss)]
    SOURCE_ENDPOINTS
        .with_label_values(&[source])
        .set(endpoints as f64);
    AGGREGATION_DURATION_SECONDS
        .with_label_values(&[source])
        .observe(duration.as_secs_f64());
}

/// Record a failed endpoint call
///
/// # Arguments
/// * `source` - Source name
pub fn record_source_error(source: &str) {
    SOURCE_ERRORS_TOTAL.with_label_values(&[source]).inc();
}

/// Record an object skipped by a collector
///
/// # Arguments
/// * `source` - Source name
/// * `reason` - Why it was skipped
pub fn record_object_skipped(source: &str, reason: &str) {
    OBJECTS_SKIPPED_TOTAL
        .with_label_values(&[source, reason])
        .inc();
}

/// Record an ignored TTL annotation
pub fn record_invalid_ttl() {
    INVALID_TTL_ANNOTATIONS_TOTAL.inc();
}

/// Record a discarded CNAME candidate
pub fn record_cname_conflict() {
    CNAME_CONFLICTS_TOTAL.inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Returns
/// Prometheus-formatted metrics as a String
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
