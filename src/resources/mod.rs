//! Staged cluster manifests produced by a trait pipeline run
//!
//! This module defines the manifest value types traits stage (Service,
//! Deployment and their parts) and the [`ResourceSet`] collection that holds
//! them: an ordered sequence with typed first-match lookup and append, no
//! removal. Nothing here talks to the cluster; persistence of staged entries
//! belongs to the layer above this core.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// =============================================================================
// Kubernetes Resource Types
// =============================================================================

/// Standard Kubernetes ObjectMeta
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Resource name
    pub name: String,
    /// Resource namespace
    pub namespace: String,
    /// Labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl ObjectMeta {
    /// Create new metadata with standard Caravan labels
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        let name = name.into();
        let mut labels = BTreeMap::new();
        labels.insert("app.kubernetes.io/name".to_string(), name.clone());
        labels.insert(
            "app.kubernetes.io/managed-by".to_string(),
            "caravan".to_string(),
        );
        Self {
            name,
            namespace: namespace.into(),
            labels,
        }
    }

    /// Add a label
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// Label selector
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    /// Match labels
    pub match_labels: BTreeMap<String, String>,
}

// =============================================================================
// Deployment
// =============================================================================

/// Kubernetes Deployment
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    /// API version
    pub api_version: String,
    /// Kind
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    pub spec: DeploymentSpec,
}

/// Deployment spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSpec {
    /// Number of replicas
    pub replicas: u32,
    /// Label selector
    pub selector: LabelSelector,
    /// Pod template
    pub template: PodTemplateSpec,
}

/// Pod template spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodTemplateSpec {
    /// Pod metadata
    pub metadata: PodMeta,
    /// Pod spec
    pub spec: PodSpec,
}

/// Pod metadata (subset of ObjectMeta)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodMeta {
    /// Labels
    pub labels: BTreeMap<String, String>,
}

/// Pod spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    /// Containers
    pub containers: Vec<Container>,
}

/// Container spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// Container name
    pub name: String,
    /// Image
    pub image: String,
    /// Ports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ContainerPort>,
}

/// Container port
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
    /// Port name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Port number
    pub container_port: u16,
    /// Protocol
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

// =============================================================================
// Service
// =============================================================================

/// Kubernetes Service
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// API version
    pub api_version: String,
    /// Kind
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    pub spec: ServiceSpec,
}

/// Service spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSpec {
    /// Selector
    pub selector: BTreeMap<String, String>,
    /// Ports
    pub ports: Vec<ServicePort>,
}

/// Service port
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServicePort {
    /// Port name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Port number
    pub port: u16,
    /// Name of the container port this port targets
    ///
    /// Ports are bound by name, not number, so the service port stays
    /// decoupled from the eventual container port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_port: Option<String>,
    /// Protocol
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

// =============================================================================
// ResourceSet
// =============================================================================

/// One staged cluster manifest
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Resource {
    /// A staged Service
    Service(Service),
    /// A staged Deployment
    Deployment(Deployment),
}

impl Resource {
    /// Name of the staged resource
    pub fn name(&self) -> &str {
        match self {
            Self::Service(s) => &s.metadata.name,
            Self::Deployment(d) => &d.metadata.name,
        }
    }
}

/// Ordered collection of staged manifests
///
/// Mutated only by trait Apply and post-processors, strictly sequentially.
/// Entries are identified by (kind, name): callers look up before adding, so
/// re-running an unchanged pipeline never duplicates an entry.
#[derive(Debug, Default)]
pub struct ResourceSet {
    items: Vec<Resource>,
}

impl ResourceSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a staged resource
    pub fn add(&mut self, resource: Resource) {
        self.items.push(resource);
    }

    /// Number of staged resources
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when nothing has been staged
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate staged resources in staging order
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.items.iter()
    }

    /// First staged Service matching the predicate
    pub fn first_service<P>(&self, pred: P) -> Option<&Service>
    where
        P: Fn(&Service) -> bool,
    {
        self.items.iter().find_map(|r| match r {
            Resource::Service(s) if pred(s) => Some(s),
            _ => None,
        })
    }

    /// First staged Service matching the predicate, mutably
    pub fn first_service_mut<P>(&mut self, pred: P) -> Option<&mut Service>
    where
        P: Fn(&Service) -> bool,
    {
        self.items.iter_mut().find_map(|r| match r {
            Resource::Service(s) if pred(s) => Some(s),
            _ => None,
        })
    }

    /// First staged Deployment matching the predicate
    pub fn first_deployment<P>(&self, pred: P) -> Option<&Deployment>
    where
        P: Fn(&Deployment) -> bool,
    {
        self.items.iter().find_map(|r| match r {
            Resource::Deployment(d) if pred(d) => Some(d),
            _ => None,
        })
    }

    /// Get the Service with the given name, staging a fresh one if absent
    pub fn service_or_insert_with<F>(&mut self, name: &str, make: F) -> &mut Service
    where
        F: FnOnce() -> Service,
    {
        let pos = self
            .items
            .iter()
            .position(|r| matches!(r, Resource::Service(s) if s.metadata.name == name));
        let pos = match pos {
            Some(pos) => pos,
            None => {
                self.items.push(Resource::Service(make()));
                self.items.len() - 1
            }
        };
        match &mut self.items[pos] {
            Resource::Service(service) => service,
            // pos indexes a Service entry: either matched or just appended
            _ => unreachable!("resource at {pos} is a Service"),
        }
    }

    /// Get the Deployment with the given name, staging a fresh one if absent
    pub fn deployment_or_insert_with<F>(&mut self, name: &str, make: F) -> &mut Deployment
    where
        F: FnOnce() -> Deployment,
    {
        let pos = self
            .items
            .iter()
            .position(|r| matches!(r, Resource::Deployment(d) if d.metadata.name == name));
        let pos = match pos {
            Some(pos) => pos,
            None => {
                self.items.push(Resource::Deployment(make()));
                self.items.len() - 1
            }
        };
        match &mut self.items[pos] {
            Resource::Deployment(deployment) => deployment,
            // pos indexes a Deployment entry: either matched or just appended
            _ => unreachable!("resource at {pos} is a Deployment"),
        }
    }

    /// First container matching the predicate across all staged Deployments,
    /// mutably
    pub fn first_container_mut<P>(&mut self, pred: P) -> Option<&mut Container>
    where
        P: Fn(&Container) -> bool,
    {
        self.items.iter_mut().find_map(|r| match r {
            Resource::Deployment(d) => d
                .spec
                .template
                .spec
                .containers
                .iter_mut()
                .find(|c| pred(c)),
            _ => None,
        })
    }
}
