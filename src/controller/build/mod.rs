//! Build reconciliation actions
//!
//! An [`Action`] reconciles a Build resource's phase against external process
//! state. [`Action::can_handle`] is a pure predicate re-evaluated on every
//! reconcile tick; [`Action::handle`] returns either the mutated build or
//! `None` when nothing changed, so the caller never emits a spurious update.
//!
//! The set of actions is closed and registered once at process start.

mod monitor_pod;

pub use monitor_pod::MonitorPodAction;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::Api;
use kube::Client;

#[cfg(test)]
use mockall::automock;

use crate::build::Status;
use crate::crd::{Build, BuildPhase};
use crate::Result;

/// A CanHandle/Handle handler over the Build resource
#[async_trait]
pub trait Action: Send + Sync {
    /// A common name for the action
    fn name(&self) -> &'static str;

    /// Tells whether this action can handle the build
    ///
    /// Pure over the build snapshot; no external state is consulted.
    fn can_handle(&self, build: &Build) -> bool;

    /// Reconcile the build
    ///
    /// Returns the mutated build, or `None` when the observed state implies
    /// no phase change.
    async fn handle(&self, build: &Build) -> Result<Option<Build>>;
}

/// Lifecycle phase of an externally managed pod
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PodPhase {
    /// Pod accepted but containers not running
    Pending,
    /// Pod containers are running
    Running,
    /// All containers terminated successfully
    Succeeded,
    /// At least one container terminated in failure
    Failed,
    /// Pod state could not be obtained
    Unknown,
}

impl From<&str> for PodPhase {
    fn from(phase: &str) -> Self {
        match phase {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// Pod lookup abstraction for build actions
///
/// "Not found" is a first-class branch (`Ok(None)`), never an error: polled
/// external state may legitimately not exist yet. Transient API failures
/// propagate unchanged; retry policy belongs to the caller.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PodClient: Send + Sync {
    /// Phase of the named pod, or `None` when the pod does not exist
    async fn pod_phase(&self, namespace: &str, name: &str) -> Result<Option<PodPhase>>;
}

/// Pod client backed by the cluster API
pub struct KubePodClient {
    client: Client,
}

impl KubePodClient {
    /// Create a new KubePodClient wrapping the given kube Client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PodClient for KubePodClient {
    async fn pod_phase(&self, namespace: &str, name: &str) -> Result<Option<PodPhase>> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        match api.get(name).await {
            Ok(pod) => {
                let phase = pod
                    .status
                    .and_then(|s| s.phase)
                    .map_or(PodPhase::Unknown, |p| PodPhase::from(p.as_str()));
                Ok(Some(phase))
            }
            Err(kube::Error::Api(response)) if response.code == 404 => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Name of the builder pod for a build
///
/// Derived deterministically from build metadata so monitor passes and the
/// pod-creating controller agree without coordination.
pub fn build_pod_name(build: &Build) -> String {
    format!("{}-builder", build.metadata.name.as_deref().unwrap_or_default())
}

/// Build resource phase corresponding to a delivered result status
///
/// The internal result status and the resource phase are distinct machines;
/// mapping between them is the monitor subsystem's responsibility.
pub fn phase_for_status(status: Status) -> BuildPhase {
    match status {
        Status::NotRequested => BuildPhase::Pending,
        Status::Started => BuildPhase::Running,
        Status::Completed => BuildPhase::Succeeded,
        Status::Error => BuildPhase::Failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{BuildSpec, BuildStrategy, SourceSpec};

    fn build(name: &str) -> Build {
        Build::new(
            name,
            BuildSpec {
                source: SourceSpec {
                    name: "routes.java".to_string(),
                    content: r#"from("direct:a").to("log:b");"#.to_string(),
                    language: Default::default(),
                },
                dependencies: Vec::new(),
                strategy: BuildStrategy::Pod,
            },
        )
    }

    #[test]
    fn test_pod_phase_parsing() {
        assert_eq!(PodPhase::from("Succeeded"), PodPhase::Succeeded);
        assert_eq!(PodPhase::from("Failed"), PodPhase::Failed);
        assert_eq!(PodPhase::from("Running"), PodPhase::Running);
        assert_eq!(PodPhase::from("Pending"), PodPhase::Pending);
        assert_eq!(PodPhase::from("SomethingElse"), PodPhase::Unknown);
    }

    #[test]
    fn test_build_pod_name_is_deterministic() {
        let build = build("petstore");
        assert_eq!(build_pod_name(&build), "petstore-builder");
        assert_eq!(build_pod_name(&build), build_pod_name(&build.clone()));
    }

    #[test]
    fn test_status_to_phase_mapping() {
        assert_eq!(phase_for_status(Status::NotRequested), BuildPhase::Pending);
        assert_eq!(phase_for_status(Status::Started), BuildPhase::Running);
        assert_eq!(phase_for_status(Status::Completed), BuildPhase::Succeeded);
        assert_eq!(phase_for_status(Status::Error), BuildPhase::Failed);
    }

    /// Terminal result statuses map to terminal resource phases, so the
    /// monitor can never regress a finished build through the mapping.
    #[test]
    fn test_terminal_statuses_map_to_terminal_phases() {
        for status in [Status::Completed, Status::Error] {
            assert!(phase_for_status(status).is_terminal());
        }
        for status in [Status::NotRequested, Status::Started] {
            assert!(!phase_for_status(status).is_terminal());
        }
    }
}
