//! Monitor action for the scheduled builder pod

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{build_pod_name, Action, PodClient, PodPhase};
use crate::crd::{Build, BuildPhase, BuildStatus, BuildStrategy};
use crate::Result;

/// Reconciles a pod-strategy build against its builder pod
///
/// One phase transition per reconcile pass: a missing pod resets the build
/// to Scheduling (the pod-creating controller observes that and recreates
/// it), a terminal pod phase maps onto the build, and anything else is a
/// no-op.
pub struct MonitorPodAction {
    pods: Arc<dyn PodClient>,
}

impl MonitorPodAction {
    /// Create a new monitor action over the given pod client
    pub fn new(pods: Arc<dyn PodClient>) -> Self {
        Self { pods }
    }
}

#[async_trait]
impl Action for MonitorPodAction {
    fn name(&self) -> &'static str {
        "monitor-pod"
    }

    fn can_handle(&self, build: &Build) -> bool {
        matches!(
            build.phase(),
            Some(BuildPhase::Pending | BuildPhase::Running)
        ) && build.spec.strategy == BuildStrategy::Pod
    }

    async fn handle(&self, build: &Build) -> Result<Option<Build>> {
        let namespace = build.metadata.namespace.as_deref().unwrap_or_default();
        let pod_name = build_pod_name(build);

        let Some(pod_phase) = self.pods.pod_phase(namespace, &pod_name).await? else {
            // The builder pod was lost or never created. Not an error: hand
            // the build back to scheduling so the owning controller recreates
            // the pod.
            debug!(pod = %pod_name, "builder pod not found, rescheduling build");
            let mut rescheduled = build.clone();
            rescheduled
                .status
                .get_or_insert_with(BuildStatus::default)
                .phase = Some(BuildPhase::Scheduling);
            return Ok(Some(rescheduled));
        };

        let phase = match pod_phase {
            PodPhase::Succeeded => Some(BuildPhase::Succeeded),
            PodPhase::Failed => Some(BuildPhase::Failed),
            _ => None,
        };

        match phase {
            Some(phase) if build.phase() != Some(phase) => {
                debug!(pod = %pod_name, %phase, "builder pod reached a terminal phase");
                let mut updated = build.clone();
                updated.status.get_or_insert_with(BuildStatus::default).phase = Some(phase);
                Ok(Some(updated))
            }
            // Status already up to date, or the pod has not reached a
            // terminal phase yet.
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::build::MockPodClient;
    use crate::crd::{BuildSpec, BuildStrategy, SourceSpec};
    use crate::Error;

    fn build(phase: Option<BuildPhase>, strategy: BuildStrategy) -> Build {
        let mut build = Build::new(
            "petstore",
            BuildSpec {
                source: SourceSpec {
                    name: "Petstore.java".to_string(),
                    content: r#"from("undertow:http://0.0.0.0:8080").to("log:pets");"#.to_string(),
                    language: Default::default(),
                },
                dependencies: Vec::new(),
                strategy,
            },
        );
        build.metadata.namespace = Some("default".to_string());
        build.status = Some(BuildStatus {
            phase,
            ..Default::default()
        });
        build
    }

    fn action(pods: MockPodClient) -> MonitorPodAction {
        MonitorPodAction::new(Arc::new(pods))
    }

    mod can_handle {
        use super::*;

        #[test]
        fn test_handles_pending_and_running_pod_builds() {
            let action = action(MockPodClient::new());
            assert!(action.can_handle(&build(Some(BuildPhase::Pending), BuildStrategy::Pod)));
            assert!(action.can_handle(&build(Some(BuildPhase::Running), BuildStrategy::Pod)));
        }

        #[test]
        fn test_ignores_other_phases() {
            let action = action(MockPodClient::new());
            assert!(!action.can_handle(&build(Some(BuildPhase::Scheduling), BuildStrategy::Pod)));
            assert!(!action.can_handle(&build(Some(BuildPhase::Succeeded), BuildStrategy::Pod)));
            assert!(!action.can_handle(&build(Some(BuildPhase::Failed), BuildStrategy::Pod)));
            assert!(!action.can_handle(&build(None, BuildStrategy::Pod)));
        }

        #[test]
        fn test_ignores_other_build_strategies() {
            let action = action(MockPodClient::new());
            assert!(!action.can_handle(&build(Some(BuildPhase::Pending), BuildStrategy::Routine)));
        }
    }

    mod handle {
        use super::*;

        /// A missing builder pod is recovery, not failure: the build goes
        /// back to Scheduling so the pod gets recreated.
        #[tokio::test]
        async fn test_pod_not_found_reschedules_the_build() {
            let mut pods = MockPodClient::new();
            pods.expect_pod_phase()
                .withf(|namespace, name| namespace == "default" && name == "petstore-builder")
                .returning(|_, _| Ok(None));

            let result = action(pods)
                .handle(&build(Some(BuildPhase::Pending), BuildStrategy::Pod))
                .await
                .unwrap();

            let rescheduled = result.expect("expected a mutated build");
            assert_eq!(rescheduled.phase(), Some(BuildPhase::Scheduling));
        }

        #[tokio::test]
        async fn test_succeeded_pod_completes_a_running_build() {
            let mut pods = MockPodClient::new();
            pods.expect_pod_phase()
                .returning(|_, _| Ok(Some(PodPhase::Succeeded)));

            let result = action(pods)
                .handle(&build(Some(BuildPhase::Running), BuildStrategy::Pod))
                .await
                .unwrap();

            assert_eq!(
                result.expect("expected a mutated build").phase(),
                Some(BuildPhase::Succeeded)
            );
        }

        #[tokio::test]
        async fn test_failed_pod_fails_the_build() {
            let mut pods = MockPodClient::new();
            pods.expect_pod_phase()
                .returning(|_, _| Ok(Some(PodPhase::Failed)));

            let result = action(pods)
                .handle(&build(Some(BuildPhase::Running), BuildStrategy::Pod))
                .await
                .unwrap();

            assert_eq!(
                result.expect("expected a mutated build").phase(),
                Some(BuildPhase::Failed)
            );
        }

        /// When the build already carries the phase the pod implies, Handle
        /// signals an explicit no-op so the caller skips the update.
        #[tokio::test]
        async fn test_equal_phase_is_a_noop() {
            let mut pods = MockPodClient::new();
            pods.expect_pod_phase()
                .returning(|_, _| Ok(Some(PodPhase::Succeeded)));

            let result = action(pods)
                .handle(&build(Some(BuildPhase::Succeeded), BuildStrategy::Pod))
                .await
                .unwrap();

            assert!(result.is_none());
        }

        /// Non-terminal pod phases imply no build phase, which yields no
        /// change.
        #[tokio::test]
        async fn test_non_terminal_pod_phase_is_a_noop() {
            let mut pods = MockPodClient::new();
            pods.expect_pod_phase()
                .returning(|_, _| Ok(Some(PodPhase::Running)));

            let result = action(pods)
                .handle(&build(Some(BuildPhase::Running), BuildStrategy::Pod))
                .await
                .unwrap();

            assert!(result.is_none());
        }

        /// Lookup failures other than not-found propagate unchanged; retry
        /// policy belongs to the caller.
        #[tokio::test]
        async fn test_lookup_errors_propagate() {
            let mut pods = MockPodClient::new();
            pods.expect_pod_phase()
                .returning(|_, _| Err(Error::validation("api server unavailable")));

            let result = action(pods)
                .handle(&build(Some(BuildPhase::Running), BuildStrategy::Pod))
                .await;

            assert!(result.is_err());
        }
    }
}
