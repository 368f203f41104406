//! Integration Custom Resource Definition
//!
//! The Integration CRD is the user-declared resource: source code units plus
//! desired runtime behavior. The trait pipeline reads the spec and writes only
//! to the status sub-object.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::{Condition, ConditionStatus, IntegrationPhase, SourceSpec, TraitsSpec};

/// Specification for an Integration
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "caravan.dev",
    version = "v1alpha1",
    kind = "Integration",
    plural = "integrations",
    shortname = "it",
    status = "IntegrationStatus",
    namespaced,
    printcolumn = r#"{"name":"Phase","type":"string","jsonPath":".status.phase"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationSpec {
    /// Source code units making up the integration
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceSpec>,

    /// Explicitly declared dependency coordinates (e.g., "camel:undertow")
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    /// Per-trait configuration overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traits: Option<TraitsSpec>,
}

impl IntegrationSpec {
    /// Validate the integration specification
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.sources.is_empty() {
            return Err(crate::Error::validation("integration has no sources"));
        }
        for source in &self.sources {
            if source.name.is_empty() {
                return Err(crate::Error::validation("integration source has no name"));
            }
            if source.content.is_empty() {
                return Err(crate::Error::validation(format!(
                    "integration source '{}' has no content",
                    source.name
                )));
            }
        }
        Ok(())
    }
}

/// Status for an Integration
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationStatus {
    /// Current phase of the integration lifecycle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<IntegrationPhase>,

    /// Computed dependency coordinates, deduplicated and sorted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    /// Image produced by the last successful build
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Conditions representing the integration state, at most one per type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

impl IntegrationStatus {
    /// Upsert a condition keyed by type
    ///
    /// Any existing condition of the same type is replaced, preserving the
    /// at-most-one-condition-per-type invariant.
    pub fn set_condition(
        &mut self,
        type_: impl Into<String>,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) {
        let condition = Condition::new(type_, status, reason, message);
        self.conditions.retain(|c| c.type_ != condition.type_);
        self.conditions.push(condition);
    }

    /// Look up a condition by type
    pub fn condition(&self, type_: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.type_ == type_)
    }
}
