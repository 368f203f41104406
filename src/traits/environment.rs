//! Shared mutable context for one trait pipeline run

use std::sync::Arc;

use crate::crd::{ConditionStatus, Integration, IntegrationPhase, IntegrationStatus};
use crate::metadata::Catalog;
use crate::resources::ResourceSet;
use crate::Result;

/// A deferred mutation registered during a trait's Apply phase
///
/// Each post-processor captures whatever context it needs at registration
/// time and is invoked exactly once, after all Apply calls, in registration
/// order.
pub type PostProcessor = Box<dyn FnOnce(&mut Environment) -> Result<()> + Send>;

/// Shared mutable reconciliation context
///
/// Lives for the duration of one trait pipeline run and is discarded after
/// Apply and post-processing complete. One integration's pass never runs
/// concurrently with itself, so no internal locking is needed; the owning
/// reconciler serializes passes per integration identity.
pub struct Environment {
    /// The integration under reconciliation; mutated only through its status
    pub integration: Integration,
    /// Read-only component catalog
    pub catalog: Arc<dyn Catalog>,
    /// Manifests staged so far
    pub resources: ResourceSet,
    /// Deferred mutations, drained once after all Apply calls
    pub post_processors: Vec<PostProcessor>,
}

impl Environment {
    /// Create a fresh environment for one pipeline run
    pub fn new(integration: Integration, catalog: Arc<dyn Catalog>) -> Self {
        Self {
            integration,
            catalog,
            resources: ResourceSet::new(),
            post_processors: Vec::new(),
        }
    }

    /// Name of the integration under reconciliation
    pub fn integration_name(&self) -> &str {
        self.integration.metadata.name.as_deref().unwrap_or_default()
    }

    /// Namespace of the integration under reconciliation
    pub fn integration_namespace(&self) -> &str {
        self.integration
            .metadata
            .namespace
            .as_deref()
            .unwrap_or_default()
    }

    /// Whether the integration is currently in the given lifecycle phase
    pub fn integration_in_phase(&self, phase: IntegrationPhase) -> bool {
        self.integration
            .status
            .as_ref()
            .and_then(|s| s.phase.as_ref())
            == Some(&phase)
    }

    /// The integration status, created empty on first access
    pub fn status_mut(&mut self) -> &mut IntegrationStatus {
        self.integration
            .status
            .get_or_insert_with(IntegrationStatus::default)
    }

    /// Upsert a condition on the integration status
    pub fn set_condition(
        &mut self,
        type_: impl Into<String>,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.status_mut()
            .set_condition(type_, status, reason, message);
    }
}
