//! Build Custom Resource Definition
//!
//! A Build tracks one attempt to produce a runnable artifact from integration
//! source. Its phase machine is advanced one transition per reconcile pass by
//! the build actions in [`crate::controller`].

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::SourceSpec;

/// Specification for a Build
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "caravan.dev",
    version = "v1alpha1",
    kind = "Build",
    plural = "builds",
    status = "BuildStatus",
    namespaced,
    printcolumn = r#"{"name":"Phase","type":"string","jsonPath":".status.phase"}"#,
    printcolumn = r#"{"name":"Strategy","type":"string","jsonPath":".spec.strategy"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct BuildSpec {
    /// The source unit to build
    pub source: SourceSpec,

    /// Dependency coordinates the artifact must carry
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    /// How the build is executed
    #[serde(default)]
    pub strategy: BuildStrategy,
}

/// How a build is executed
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum BuildStrategy {
    /// In-process build routine owned by the operator
    #[default]
    Routine,
    /// Dedicated builder pod managed through the cluster
    Pod,
}

impl std::fmt::Display for BuildStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Routine => write!(f, "routine"),
            Self::Pod => write!(f, "pod"),
        }
    }
}

/// Build lifecycle phase
///
/// Succeeded and Failed are terminal. The only backwards transition is the
/// controlled reset to Scheduling when the builder pod has gone missing.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[non_exhaustive]
pub enum BuildPhase {
    /// Waiting for a builder pod to be (re)created
    Scheduling,
    /// Builder pod exists but has not started
    Pending,
    /// Build is executing
    Running,
    /// Artifact was produced
    Succeeded,
    /// Build failed
    Failed,
}

impl BuildPhase {
    /// Returns true for phases no reconcile pass may leave
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl std::fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scheduling => write!(f, "Scheduling"),
            Self::Pending => write!(f, "Pending"),
            Self::Running => write!(f, "Running"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Status for a Build
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatus {
    /// Current phase of the build lifecycle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<BuildPhase>,

    /// Image produced on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Failure detail on error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Build {
    /// Current phase, if the build has one
    pub fn phase(&self) -> Option<BuildPhase> {
        self.status.as_ref().and_then(|s| s.phase)
    }
}
