// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-collector endpoint assembly.
//!
//! Every collector turns its objects into endpoints the same way:
//!
//! 1. Skip objects claimed by another controller.
//! 2. Synthesize endpoints from annotation hostnames and targets, plus whatever
//!    hostnames/targets the collector extracted natively. Annotation targets override
//!    native targets when present.
//! 3. Optionally synthesize endpoints from templates. A host:target pair template takes
//!    precedence over the FQDN template.
//! 4. Combine both sets according to the [`CombineMode`].
//! 5. Attach provider-specific pairs, set identifier, `resource` label, dual-stack
//!    label, and the TTL floor from annotations.
//! 6. Merge the endpoints of all objects.
//!
//! [`EndpointAssembler`] holds the compiled templates so they are parsed once per
//! collector.

use crate::annotations::{
    hostnames_from_annotations, is_controller_mismatch, is_dualstack,
    provider_specific_annotations, set_identifier_from_annotations, targets_from_annotations,
    ttl_from_annotations,
};
use crate::endpoint::Endpoint;
use crate::errors::TemplateError;
use crate::labels::{DUALSTACK_LABEL_KEY, RESOURCE_LABEL_KEY};
use crate::merge::merge_endpoints;
use crate::metrics;
use crate::synthesis::{endpoints_for_host_target_pairs, endpoints_for_hosts_and_targets};
use crate::template::{combine_with_templated, CombineMode, Template, TemplateContext};
use tracing::debug;

/// Skip reason recorded when the controller annotation names another controller
pub const SKIP_CONTROLLER_MISMATCH: &str = "controller_mismatch";

/// One object as seen by the assembler.
#[derive(Clone, Debug, Default)]
pub struct AssemblyInput {
    /// Provenance label value, `kind/namespace/name`
    pub resource: String,
    /// Hostnames the collector extracted from the object itself
    pub hostnames: Vec<String>,
    /// Targets the collector extracted from the object itself
    pub targets: Vec<String>,
    /// Template context; its annotations are the object's annotations
    pub context: TemplateContext,
}

/// Compiled templates and combination policy of one collector.
#[derive(Clone, Debug)]
pub struct EndpointAssembler {
    source: String,
    fqdn_template: Option<Template>,
    target_template: Option<Template>,
    host_target_template: Option<Template>,
    combine_mode: CombineMode,
}

impl EndpointAssembler {
    /// Compiles the collector's templates.
    ///
    /// # Arguments
    ///
    /// * `source` - Collector name, used in metrics
    /// * `fqdn_template` - Hostname template, empty for none
    /// * `target_template` - Target template used with `fqdn_template`, empty for none
    /// * `host_target_template` - `host:target` pair template, empty for none
    /// * `combine_mode` - How template endpoints combine with annotation endpoints
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Syntax`] if any template does not parse.
    pub fn new(
        source: &str,
        fqdn_template: &str,
        target_template: &str,
        host_target_template: &str,
        combine_mode: CombineMode,
    ) -> Result<Self, TemplateError> {
        Ok(Self {
            source: source.to_string(),
            fqdn_template: Template::compile(fqdn_template)?,
            target_template: Template::compile(target_template)?,
            host_target_template: Template::compile(host_target_template)?,
            combine_mode,
        })
    }

    /// Assembles and merges the endpoints of every object.
    ///
    /// # Errors
    ///
    /// Returns the first template execution error; no partial result is returned.
    pub fn assemble<I>(&self, objects: I) -> Result<Vec<Endpoint>, TemplateError>
    where
        I: IntoIterator<Item = AssemblyInput>,
    {
        let mut endpoints = Vec::new();
        for object in objects {
            endpoints.extend(self.endpoints_for_object(&object)?);
        }
        Ok(merge_endpoints(endpoints))
    }

    /// Endpoints of a single object, before cross-object merge.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Execution`] if a template fails to render.
    pub fn endpoints_for_object(
        &self,
        object: &AssemblyInput,
    ) -> Result<Vec<Endpoint>, TemplateError> {
        let annotations = &object.context.annotations;

        if is_controller_mismatch(annotations) {
            debug!(
                resource = %object.resource,
                "Skipping object because it is owned by another controller"
            );
            metrics::record_object_skipped(&self.source, SKIP_CONTROLLER_MISMATCH);
            return Ok(Vec::new());
        }

        let mut hostnames = hostnames_from_annotations(annotations);
        hostnames.extend(object.hostnames.iter().cloned());

        let mut targets = targets_from_annotations(annotations);
        if targets.is_empty() {
            targets.clone_from(&object.targets);
        }

        let from_annotations = endpoints_for_hosts_and_targets(&hostnames, &targets);

        let endpoints = if let Some(template) = &self.host_target_template {
            combine_with_templated(from_annotations, Some(template), self.combine_mode, |t| {
                let pairs = t.execute(&object.context)?;
                Ok(endpoints_for_host_target_pairs(&pairs, &object.context.describe()))
            })?
        } else {
            combine_with_templated(
                from_annotations,
                self.fqdn_template.as_ref(),
                self.combine_mode,
                |t| self.endpoints_from_fqdn_template(t, object, &targets),
            )?
        };

        let provider_specific = provider_specific_annotations(annotations);
        let set_identifier = set_identifier_from_annotations(annotations);
        let ttl = ttl_from_annotations(annotations, &object.resource);
        let dualstack = is_dualstack(annotations);

        Ok(endpoints
            .into_iter()
            .map(|mut ep| {
                ep.provider_specific.clone_from(&provider_specific);
                if !set_identifier.is_empty() {
                    ep.set_identifier.clone_from(&set_identifier);
                }
                if dualstack {
                    ep = ep.with_label(DUALSTACK_LABEL_KEY, "true");
                }
                ep.with_label(RESOURCE_LABEL_KEY, object.resource.as_str())
                    .with_min_ttl(ttl)
            })
            .collect())
    }

    fn endpoints_from_fqdn_template(
        &self,
        template: &Template,
        object: &AssemblyInput,
        resolved_targets: &[String],
    ) -> Result<Vec<Endpoint>, TemplateError> {
        let hostnames = template.execute(&object.context)?;
        if hostnames.is_empty() {
            return Ok(Vec::new());
        }

        let targets = match &self.target_template {
            Some(target_template) => target_template.execute(&object.context)?,
            None => resolved_targets.to_vec(),
        };

        Ok(endpoints_for_hosts_and_targets(&hostnames, &targets))
    }
}

#[cfg(test)]
#[path = "assembly_tests.rs"]
mod assembly_tests;
