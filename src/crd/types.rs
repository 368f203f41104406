//! Supporting types for the Integration CRD

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Condition type recording whether an integration exposes a Service
pub const CONDITION_SERVICE_AVAILABLE: &str = "ServiceAvailable";

/// Condition reason used when the service mapping was staged
pub const REASON_SERVICE_AVAILABLE: &str = "ServiceAvailable";

/// Condition reason used when no service will be created
pub const REASON_SERVICE_NOT_AVAILABLE: &str = "ServiceNotAvailable";

/// Source language of one unit of integration code
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[non_exhaustive]
pub enum Language {
    /// Java source
    #[default]
    #[serde(rename = "java")]
    Java,
    /// Groovy script
    #[serde(rename = "groovy")]
    Groovy,
    /// JavaScript source
    #[serde(rename = "js")]
    JavaScript,
    /// XML route definition
    #[serde(rename = "xml")]
    Xml,
    /// YAML route definition
    #[serde(rename = "yaml")]
    Yaml,
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Java => write!(f, "java"),
            Self::Groovy => write!(f, "groovy"),
            Self::JavaScript => write!(f, "js"),
            Self::Xml => write!(f, "xml"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

/// One unit of integration code
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SourceSpec {
    /// Source file name
    pub name: String,
    /// Source text
    pub content: String,
    /// Source language
    #[serde(default)]
    pub language: Language,
}

/// Integration lifecycle phase
///
/// A fresh integration carries no phase at all; the status field is an
/// `Option<IntegrationPhase>` so "not yet picked up" is a first-class state.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[non_exhaustive]
pub enum IntegrationPhase {
    /// Sources are being classified and dependencies computed
    Initialization,
    /// An artifact is being built from the computed dependency set
    Building,
    /// Cluster manifests are being staged for the built artifact
    Deploying,
    /// The integration is running
    Running,
    /// The integration has encountered an error
    Error,
}

impl std::fmt::Display for IntegrationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialization => write!(f, "Initialization"),
            Self::Building => write!(f, "Building"),
            Self::Deploying => write!(f, "Deploying"),
            Self::Running => write!(f, "Running"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// Condition status following Kubernetes conventions
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum ConditionStatus {
    /// Condition is true
    True,
    /// Condition is false
    False,
    /// Condition status is unknown
    #[default]
    Unknown,
}

impl std::fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::True => write!(f, "True"),
            Self::False => write!(f, "False"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Kubernetes-style condition for status reporting
///
/// Conditions are keyed by type: status holders upsert so at most one
/// condition per type exists at any time.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct Condition {
    /// Type of condition (e.g., ServiceAvailable)
    #[serde(rename = "type")]
    pub type_: String,

    /// Status of the condition (True, False, Unknown)
    pub status: ConditionStatus,

    /// Machine-readable reason for the condition
    pub reason: String,

    /// Human-readable message
    pub message: String,

    /// Last time the condition transitioned
    #[serde(rename = "lastTransitionTime")]
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    /// Create a new condition with the current timestamp
    pub fn new(
        type_: impl Into<String>,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            type_: type_.into(),
            status,
            reason: reason.into(),
            message: message.into(),
            last_transition_time: Utc::now(),
        }
    }
}

/// Per-trait configuration declared on the Integration spec
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TraitsSpec {
    /// Deployment trait configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<DeploymentTraitSpec>,

    /// Service trait configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceTraitSpec>,
}

/// User-facing configuration for the deployment trait
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentTraitSpec {
    /// Explicitly enable or disable the trait
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// User-facing configuration for the service trait
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTraitSpec {
    /// Explicitly enable or disable the trait
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Derive the need for a service from source metadata (default: on)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto: Option<bool>,

    /// Service port (default: 80)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Service port name (default: "http")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_name: Option<String>,

    /// Container port (default: 8080)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_port: Option<u16>,

    /// Container port name (default: "http")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_port_name: Option<String>,
}
