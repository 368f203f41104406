//! Deployment trait
//!
//! Stages the integration's Deployment with the integration container. The
//! container entry staged here is what later traits' post-processors target
//! when they need to touch the running workload (e.g., adding a container
//! port).

use std::collections::BTreeMap;

use crate::crd::{DeploymentTraitSpec, IntegrationPhase};
use crate::resources::{
    Container, Deployment, DeploymentSpec, LabelSelector, ObjectMeta, PodMeta, PodSpec,
    PodTemplateSpec,
};
use crate::traits::{Environment, Trait};
use crate::{Error, Result, INTEGRATION_LABEL};

/// Stages the integration Deployment during the Deploying phase
pub struct DeploymentTrait {
    enabled: Option<bool>,
}

impl DeploymentTrait {
    /// Build the trait from its spec configuration block
    pub fn from_spec(spec: Option<&DeploymentTraitSpec>) -> Self {
        Self {
            enabled: spec.and_then(|s| s.enabled),
        }
    }
}

impl Default for DeploymentTrait {
    fn default() -> Self {
        Self::from_spec(None)
    }
}

impl Trait for DeploymentTrait {
    fn name(&self) -> &'static str {
        "deployment"
    }

    fn configure(&self, env: &mut Environment) -> Result<bool> {
        if self.enabled == Some(false) {
            return Ok(false);
        }
        Ok(env.integration_in_phase(IntegrationPhase::Deploying))
    }

    fn apply(&self, env: &mut Environment) -> Result<()> {
        let name = env.integration_name().to_string();
        let namespace = env.integration_namespace().to_string();
        let image = env
            .integration
            .status
            .as_ref()
            .and_then(|s| s.image.clone())
            .ok_or_else(|| {
                Error::validation(format!("integration '{name}' has no image to deploy"))
            })?;

        env.resources
            .deployment_or_insert_with(&name, || deployment_for(&name, &namespace, &image));

        Ok(())
    }
}

fn deployment_for(name: &str, namespace: &str, image: &str) -> Deployment {
    let mut selector = BTreeMap::new();
    selector.insert(INTEGRATION_LABEL.to_string(), name.to_string());

    Deployment {
        api_version: "apps/v1".to_string(),
        kind: "Deployment".to_string(),
        metadata: ObjectMeta::new(name, namespace).with_label(INTEGRATION_LABEL, name),
        spec: DeploymentSpec {
            replicas: 1,
            selector: LabelSelector {
                match_labels: selector.clone(),
            },
            template: PodTemplateSpec {
                metadata: PodMeta { labels: selector },
                spec: PodSpec {
                    containers: vec![Container {
                        name: name.to_string(),
                        image: image.to_string(),
                        ports: Vec::new(),
                    }],
                },
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::crd::{Integration, IntegrationSpec, TraitsSpec};
    use crate::metadata::StaticCatalog;

    fn environment() -> Environment {
        let mut integration = Integration::new("petstore", IntegrationSpec::default());
        integration.metadata.namespace = Some("default".to_string());
        Environment::new(integration, Arc::new(StaticCatalog::default_camel()))
    }

    fn deploying(env: &mut Environment) {
        env.status_mut().phase = Some(IntegrationPhase::Deploying);
        env.status_mut().image = Some("registry.example/petstore:1".to_string());
    }

    #[test]
    fn test_requires_deploying_phase() {
        let mut env = environment();
        let trait_ = DeploymentTrait::default();

        assert!(!trait_.configure(&mut env).unwrap());

        env.status_mut().phase = Some(IntegrationPhase::Initialization);
        assert!(!trait_.configure(&mut env).unwrap());

        env.status_mut().phase = Some(IntegrationPhase::Deploying);
        assert!(trait_.configure(&mut env).unwrap());
    }

    #[test]
    fn test_explicit_disable_wins_over_phase() {
        let mut env = environment();
        deploying(&mut env);

        let spec = TraitsSpec {
            deployment: Some(DeploymentTraitSpec {
                enabled: Some(false),
            }),
            ..Default::default()
        };
        let trait_ = DeploymentTrait::from_spec(spec.deployment.as_ref());

        assert!(!trait_.configure(&mut env).unwrap());
    }

    #[test]
    fn test_stages_deployment_with_integration_container() {
        let mut env = environment();
        deploying(&mut env);

        DeploymentTrait::default().apply(&mut env).unwrap();

        let deployment = env
            .resources
            .first_deployment(|d| d.metadata.name == "petstore")
            .unwrap();
        assert_eq!(deployment.spec.replicas, 1);
        assert_eq!(
            deployment
                .spec
                .selector
                .match_labels
                .get(INTEGRATION_LABEL)
                .map(String::as_str),
            Some("petstore")
        );

        let container = &deployment.spec.template.spec.containers[0];
        assert_eq!(container.name, "petstore");
        assert_eq!(container.image, "registry.example/petstore:1");
        assert!(container.ports.is_empty());
    }

    #[test]
    fn test_missing_image_is_a_validation_error() {
        let mut env = environment();
        env.status_mut().phase = Some(IntegrationPhase::Deploying);

        let result = DeploymentTrait::default().apply(&mut env);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("no image"));
    }

    #[test]
    fn test_reapply_does_not_duplicate_the_deployment() {
        let mut env = environment();
        deploying(&mut env);

        let trait_ = DeploymentTrait::default();
        trait_.apply(&mut env).unwrap();
        trait_.apply(&mut env).unwrap();

        assert_eq!(env.resources.len(), 1);
    }
}
