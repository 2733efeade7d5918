// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Annotation and label key registry shared by every collector.
//!
//! All collectors read the same annotation vocabulary. Keeping the keys here, rather
//! than as literals in each source, guarantees that every resource kind honours the
//! same conventions.

// ============================================================================
// Annotation Namespace
// ============================================================================

/// Common prefix of every annotation understood by the engine
pub const ANNOTATION_KEY_PREFIX: &str = "external-dns.alpha.kubernetes.io/";

// ============================================================================
// Endpoint Annotations
// ============================================================================

/// Comma-separated list of hostnames to publish for the annotated object
pub const HOSTNAME_KEY: &str = "external-dns.alpha.kubernetes.io/hostname";

/// Comma-separated list of hostnames to publish with the object's internal address
pub const INTERNAL_HOSTNAME_KEY: &str = "external-dns.alpha.kubernetes.io/internal-hostname";

/// Comma-separated list of targets overriding the ones discovered from the object
pub const TARGET_KEY: &str = "external-dns.alpha.kubernetes.io/target";

/// Record TTL, as integer seconds or a duration such as `10m`
pub const TTL_KEY: &str = "external-dns.alpha.kubernetes.io/ttl";

/// Set identifier distinguishing records sharing name and type
pub const SET_IDENTIFIER_KEY: &str = "external-dns.alpha.kubernetes.io/set-identifier";

/// Alias record preference (`"true"` requests an alias record where supported)
pub const ALIAS_KEY: &str = "external-dns.alpha.kubernetes.io/alias";

/// Controller ownership annotation
pub const CONTROLLER_KEY: &str = "external-dns.alpha.kubernetes.io/controller";

/// Value of [`CONTROLLER_KEY`] identifying this system as the owning controller
pub const CONTROLLER_VALUE: &str = "dns-controller";

// ============================================================================
// Provider-Specific Annotations
// ============================================================================

/// Cloudflare proxy toggle, passed through unchanged
pub const CLOUDFLARE_PROXIED_KEY: &str = "external-dns.alpha.kubernetes.io/cloudflare-proxied";

/// Cloudflare custom hostname, passed through unchanged
pub const CLOUDFLARE_CUSTOM_HOSTNAME_KEY: &str =
    "external-dns.alpha.kubernetes.io/cloudflare-custom-hostname";

/// Cloudflare regional services key, passed through unchanged
pub const CLOUDFLARE_REGION_KEY: &str = "external-dns.alpha.kubernetes.io/cloudflare-region-key";

/// Cloudflare record comment, passed through unchanged
pub const CLOUDFLARE_RECORD_COMMENT_KEY: &str =
    "external-dns.alpha.kubernetes.io/cloudflare-record-comment";

/// Cloudflare record tags, passed through unchanged
pub const CLOUDFLARE_TAGS_KEY: &str = "external-dns.alpha.kubernetes.io/cloudflare-tags";

/// Keys forwarded verbatim as provider-specific properties
pub const PASSTHROUGH_PROVIDER_KEYS: &[&str] = &[
    CLOUDFLARE_PROXIED_KEY,
    CLOUDFLARE_CUSTOM_HOSTNAME_KEY,
    CLOUDFLARE_REGION_KEY,
    CLOUDFLARE_RECORD_COMMENT_KEY,
    CLOUDFLARE_TAGS_KEY,
];

/// Vendor prefix for AWS attributes (`aws-weight` becomes `aws/weight`)
pub const AWS_PREFIX: &str = "aws-";

/// Vendor prefix for Scaleway attributes (`scw-x` becomes `scw/x`)
pub const SCW_PREFIX: &str = "scw-";

/// Vendor prefix for webhook provider attributes (`webhook-x` becomes `webhook/x`)
pub const WEBHOOK_PREFIX: &str = "webhook-";

/// Vendor prefix for IBM Cloud attributes (kept as `ibmcloud-x`)
pub const IBMCLOUD_PREFIX: &str = "ibmcloud-";

/// Name of the provider-specific property produced by [`ALIAS_KEY`]
pub const ALIAS_PROPERTY: &str = "alias";

// ============================================================================
// Third-Party Annotations
// ============================================================================

/// AWS load balancer controller address type annotation
pub const ALB_IP_ADDRESS_TYPE_KEY: &str = "alb.ingress.kubernetes.io/ip-address-type";

/// Value of [`ALB_IP_ADDRESS_TYPE_KEY`] requesting dual-stack records
pub const ALB_DUALSTACK_VALUE: &str = "dualstack";

// ============================================================================
// Endpoint Labels
// ============================================================================

/// Label carrying the `kind/namespace/name` of the object that produced an endpoint
pub const RESOURCE_LABEL_KEY: &str = "resource";

/// Label carrying the owner identifier of an endpoint
pub const OWNER_LABEL_KEY: &str = "owner";

/// Label marking an endpoint as dual-stack
pub const DUALSTACK_LABEL_KEY: &str = "dualstack";
