//! The trait pipeline
//!
//! Traits customize how an Integration is translated into staged cluster
//! objects. Each trait is polymorphic over two capabilities:
//!
//! - *Configure* answers "should this trait run now." It is side-effect-free
//!   on cluster and resource state (it may perform read-only lookups and
//!   record conditions explaining its decision).
//! - *Apply* performs all mutation: staging [`ResourceSet`](crate::resources::ResourceSet)
//!   entries, updating integration status, and registering post-processors.
//!
//! The [`TraitCatalog`] holds the closed set of traits in a fixed declarative
//! order, registered once at process start. Order matters: later traits may
//! read resources a prior trait staged.

mod dependencies;
mod deployment;
mod environment;
mod service;

pub use dependencies::DependenciesTrait;
pub use deployment::DeploymentTrait;
pub use environment::{Environment, PostProcessor};
pub use service::ServiceTrait;

use tracing::debug;

use crate::crd::Integration;
use crate::Result;

/// A Configure/Apply handler customizing integration reconciliation
pub trait Trait: Send + Sync {
    /// A common name for the trait
    fn name(&self) -> &'static str;

    /// Decide whether this trait should run for the given environment
    ///
    /// Must not mutate cluster or resource state; recording a condition that
    /// explains the decision is allowed.
    fn configure(&self, env: &mut Environment) -> Result<bool>;

    /// Perform the trait's mutations against the environment
    fn apply(&self, env: &mut Environment) -> Result<()>;
}

/// The ordered, closed set of traits applied to every integration
pub struct TraitCatalog {
    traits: Vec<Box<dyn Trait>>,
}

impl TraitCatalog {
    /// The default trait set, configured from the integration's spec
    ///
    /// Declaration order is part of the contract: dependencies must run
    /// before anything that consumes the computed set, and deployment must
    /// stage the integration container before the service post-processor
    /// looks it up.
    pub fn for_integration(integration: &Integration) -> Self {
        let spec = integration.spec.traits.clone().unwrap_or_default();
        Self {
            traits: vec![
                Box::new(DependenciesTrait),
                Box::new(DeploymentTrait::from_spec(spec.deployment.as_ref())),
                Box::new(ServiceTrait::from_spec(spec.service.as_ref())),
            ],
        }
    }

    /// A catalog over an explicit trait list
    pub fn with_traits(traits: Vec<Box<dyn Trait>>) -> Self {
        Self { traits }
    }

    /// Run the pipeline over one environment
    ///
    /// Every trait's Configure runs before any Apply; a Configure error
    /// aborts the pass with nothing staged. Apply then runs over the enabled
    /// subset in declaration order; an Apply error aborts the remaining
    /// traits but keeps what earlier traits staged - the caller decides
    /// whether to persist or discard the partial result. After a clean Apply
    /// sequence every registered post-processor runs exactly once, in
    /// registration order. A post-processor error is terminal for the pass
    /// but never unwinds staged mutations: those are idempotent to redeliver
    /// on a future pass.
    pub fn apply(&self, env: &mut Environment) -> Result<()> {
        let mut enabled = Vec::new();
        for t in &self.traits {
            if t.configure(env)? {
                debug!(name = t.name(), "trait enabled");
                enabled.push(t);
            } else {
                debug!(name = t.name(), "trait disabled");
            }
        }

        for t in enabled {
            debug!(name = t.name(), "applying trait");
            t.apply(env)?;
        }

        for processor in std::mem::take(&mut env.post_processors) {
            processor(env)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::crd::IntegrationSpec;
    use crate::error::Error;
    use crate::metadata::StaticCatalog;
    use crate::resources::{ObjectMeta, Resource, Service, ServiceSpec};

    /// Test trait recording every phase of its execution into a shared log
    struct RecordingTrait {
        name: &'static str,
        enabled: bool,
        log: Arc<Mutex<Vec<String>>>,
        configure_error: bool,
        apply_error: bool,
        register_post_processor: bool,
        stage_service: bool,
    }

    impl RecordingTrait {
        fn new(name: &'static str, log: Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name,
                enabled: true,
                log,
                configure_error: false,
                apply_error: false,
                register_post_processor: false,
                stage_service: false,
            }
        }

        fn record(&self, event: &str) {
            self.log.lock().unwrap().push(format!("{}:{event}", self.name));
        }
    }

    impl Trait for RecordingTrait {
        fn name(&self) -> &'static str {
            self.name
        }

        fn configure(&self, _env: &mut Environment) -> Result<bool> {
            self.record("configure");
            if self.configure_error {
                return Err(Error::configuration("configure failed"));
            }
            Ok(self.enabled)
        }

        fn apply(&self, env: &mut Environment) -> Result<()> {
            self.record("apply");
            if self.apply_error {
                return Err(Error::configuration("apply failed"));
            }
            if self.stage_service {
                env.resources.add(Resource::Service(Service {
                    api_version: "v1".to_string(),
                    kind: "Service".to_string(),
                    metadata: ObjectMeta::new(self.name, "default"),
                    spec: ServiceSpec {
                        selector: Default::default(),
                        ports: Vec::new(),
                    },
                }));
            }
            if self.register_post_processor {
                let log = Arc::clone(&self.log);
                let name = self.name;
                env.post_processors.push(Box::new(move |_env: &mut Environment| {
                    log.lock().unwrap().push(format!("{name}:post-process"));
                    Ok(())
                }));
            }
            Ok(())
        }
    }

    fn environment() -> Environment {
        Environment::new(
            Integration::new("petstore", IntegrationSpec::default()),
            Arc::new(StaticCatalog::default_camel()),
        )
    }

    #[test]
    fn test_all_configures_run_before_any_apply() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let catalog = TraitCatalog::with_traits(vec![
            Box::new(RecordingTrait::new("first", Arc::clone(&log))),
            Box::new(RecordingTrait::new("second", Arc::clone(&log))),
        ]);

        let mut env = environment();
        catalog.apply(&mut env).unwrap();

        let events = log.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "first:configure",
                "second:configure",
                "first:apply",
                "second:apply"
            ]
        );
    }

    #[test]
    fn test_disabled_traits_are_skipped_in_apply() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut disabled = RecordingTrait::new("disabled", Arc::clone(&log));
        disabled.enabled = false;
        let catalog = TraitCatalog::with_traits(vec![
            Box::new(disabled),
            Box::new(RecordingTrait::new("enabled", Arc::clone(&log))),
        ]);

        let mut env = environment();
        catalog.apply(&mut env).unwrap();

        let events = log.lock().unwrap().clone();
        assert_eq!(
            events,
            vec!["disabled:configure", "enabled:configure", "enabled:apply"]
        );
    }

    /// A Configure error aborts the whole pass before any Apply runs, so
    /// nothing is staged.
    #[test]
    fn test_configure_error_aborts_with_nothing_staged() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut stager = RecordingTrait::new("stager", Arc::clone(&log));
        stager.stage_service = true;
        let mut failing = RecordingTrait::new("failing", Arc::clone(&log));
        failing.configure_error = true;

        let catalog = TraitCatalog::with_traits(vec![Box::new(stager), Box::new(failing)]);

        let mut env = environment();
        let result = catalog.apply(&mut env);

        assert!(result.is_err());
        assert!(env.resources.is_empty());
        let events = log.lock().unwrap().clone();
        assert_eq!(events, vec!["stager:configure", "failing:configure"]);
    }

    /// An Apply error aborts the remaining traits but keeps what earlier
    /// traits already staged.
    #[test]
    fn test_apply_error_retains_earlier_staging() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut stager = RecordingTrait::new("stager", Arc::clone(&log));
        stager.stage_service = true;
        let mut failing = RecordingTrait::new("failing", Arc::clone(&log));
        failing.apply_error = true;
        let late = RecordingTrait::new("late", Arc::clone(&log));

        let catalog = TraitCatalog::with_traits(vec![
            Box::new(stager),
            Box::new(failing),
            Box::new(late),
        ]);

        let mut env = environment();
        let result = catalog.apply(&mut env);

        assert!(result.is_err());
        assert_eq!(env.resources.len(), 1);
        let events = log.lock().unwrap().clone();
        assert!(!events.contains(&"late:apply".to_string()));
    }

    /// Post-processors registered by different traits run strictly after all
    /// Apply calls, in registration order.
    #[test]
    fn test_post_processors_run_after_all_applies_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut first = RecordingTrait::new("first", Arc::clone(&log));
        first.register_post_processor = true;
        let mut second = RecordingTrait::new("second", Arc::clone(&log));
        second.register_post_processor = true;

        let catalog = TraitCatalog::with_traits(vec![Box::new(first), Box::new(second)]);

        let mut env = environment();
        catalog.apply(&mut env).unwrap();

        let events = log.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "first:configure",
                "second:configure",
                "first:apply",
                "second:apply",
                "first:post-process",
                "second:post-process"
            ]
        );
    }

    /// Two fresh passes over the same unchanged integration stage the same
    /// resources: nothing accumulates across environments.
    #[test]
    fn test_rerun_on_fresh_environment_is_reproducible() {
        let log = Arc::new(Mutex::new(Vec::new()));

        let run = |log: &Arc<Mutex<Vec<String>>>| {
            let mut stager = RecordingTrait::new("stager", Arc::clone(log));
            stager.stage_service = true;
            let catalog = TraitCatalog::with_traits(vec![Box::new(stager)]);
            let mut env = environment();
            catalog.apply(&mut env).unwrap();
            env.resources.len()
        };

        assert_eq!(run(&log), 1);
        assert_eq!(run(&log), 1);
    }
}
