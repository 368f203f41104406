//! Dependencies trait
//!
//! Computes the full dependency set an integration needs: per-source
//! component coordinates resolved through the catalog, the fixed base and
//! runtime dependencies, and whatever the user declared explicitly. The
//! result is a pure function of (sources, catalog, explicit deps), so
//! re-running Apply reproduces the identical set.

use std::collections::BTreeSet;

use tracing::debug;

use crate::crd::IntegrationPhase;
use crate::metadata;
use crate::traits::{Environment, Trait};
use crate::Result;

/// Computes and records the integration's dependency set
///
/// Runs only during Initialization: earlier the source list may be
/// incomplete, later the computed set has already fed a one-time build.
pub struct DependenciesTrait;

impl Trait for DependenciesTrait {
    fn name(&self) -> &'static str {
        "dependencies"
    }

    fn configure(&self, env: &mut Environment) -> Result<bool> {
        Ok(env.integration_in_phase(IntegrationPhase::Initialization))
    }

    fn apply(&self, env: &mut Environment) -> Result<()> {
        let mut dependencies = BTreeSet::new();
        dependencies.insert(env.catalog.base_dependency());
        dependencies.insert(env.catalog.runtime_dependency());

        let meta = metadata::extract_all(env.catalog.as_ref(), &env.integration.spec.sources);
        for scheme in &meta.schemes {
            match env.catalog.dependency_for_scheme(scheme) {
                Some(coordinate) => {
                    dependencies.insert(coordinate);
                }
                None => debug!(%scheme, "no catalog entry for scheme"),
            }
        }

        dependencies.extend(env.integration.spec.dependencies.iter().cloned());

        env.status_mut().dependencies = dependencies.into_iter().collect();
        Ok(())
    }
}
