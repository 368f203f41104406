//! Service trait
//!
//! Exposes an integration through a Kubernetes Service when its sources
//! consume an inbound HTTP endpoint. The service port targets the container
//! port by name; the container side of the mapping is added by a
//! post-processor once the integration container exists, since the container
//! is staged by a different trait.

use std::collections::BTreeMap;

use crate::crd::{
    ConditionStatus, IntegrationPhase, ServiceTraitSpec, CONDITION_SERVICE_AVAILABLE,
    REASON_SERVICE_AVAILABLE, REASON_SERVICE_NOT_AVAILABLE,
};
use crate::metadata;
use crate::resources::{ContainerPort, ObjectMeta, Service, ServicePort, ServiceSpec};
use crate::traits::{Environment, Trait};
use crate::{
    Error, Result, DEFAULT_CONTAINER_PORT, DEFAULT_SERVICE_PORT, HTTP_PORT_NAME,
    INTEGRATION_LABEL, SERVICE_TYPE_LABEL, SERVICE_TYPE_USER,
};

/// Stages the integration Service and its port mapping
pub struct ServiceTrait {
    enabled: Option<bool>,
    auto: Option<bool>,
    port: u16,
    port_name: String,
    container_port: u16,
    container_port_name: String,
}

impl ServiceTrait {
    /// Build the trait from its spec configuration block
    pub fn from_spec(spec: Option<&ServiceTraitSpec>) -> Self {
        let spec = spec.cloned().unwrap_or_default();
        Self {
            enabled: spec.enabled,
            auto: spec.auto,
            port: spec.port.unwrap_or(DEFAULT_SERVICE_PORT),
            port_name: spec.port_name.unwrap_or_else(|| HTTP_PORT_NAME.to_string()),
            container_port: spec.container_port.unwrap_or(DEFAULT_CONTAINER_PORT),
            container_port_name: spec
                .container_port_name
                .unwrap_or_else(|| HTTP_PORT_NAME.to_string()),
        }
    }
}

impl Default for ServiceTrait {
    fn default() -> Self {
        Self::from_spec(None)
    }
}

impl Trait for ServiceTrait {
    fn name(&self) -> &'static str {
        "service"
    }

    fn configure(&self, env: &mut Environment) -> Result<bool> {
        if self.enabled == Some(false) {
            env.set_condition(
                CONDITION_SERVICE_AVAILABLE,
                ConditionStatus::False,
                REASON_SERVICE_NOT_AVAILABLE,
                "explicitly disabled",
            );
            return Ok(false);
        }

        if !env.integration_in_phase(IntegrationPhase::Deploying) {
            return Ok(false);
        }

        if self.auto.unwrap_or(true) {
            let meta = metadata::extract_all(env.catalog.as_ref(), &env.integration.spec.sources);
            if !meta.requires_http_service {
                env.set_condition(
                    CONDITION_SERVICE_AVAILABLE,
                    ConditionStatus::False,
                    REASON_SERVICE_NOT_AVAILABLE,
                    "no http service required",
                );
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn apply(&self, env: &mut Environment) -> Result<()> {
        let name = env.integration_name().to_string();
        let namespace = env.integration_namespace().to_string();

        // Either update the service staged by a previously executed trait or
        // stage a new one for this integration.
        let svc = env
            .resources
            .service_or_insert_with(&name, || service_for(&name, &namespace));
        svc.spec.ports.push(ServicePort {
            name: Some(self.port_name.clone()),
            port: self.port,
            target_port: Some(self.container_port_name.clone()),
            protocol: Some("TCP".to_string()),
        });
        svc.metadata
            .labels
            .insert(SERVICE_TYPE_LABEL.to_string(), SERVICE_TYPE_USER.to_string());

        // The integration container may not be staged yet; defer the
        // container side of the port mapping to post-processing, by which
        // time a correctly ordered pipeline has staged it.
        let service_name = name;
        let port_name = self.port_name.clone();
        let port = self.port;
        let container_port_name = self.container_port_name.clone();
        let container_port = self.container_port;

        env.post_processors.push(Box::new(move |env: &mut Environment| {
            let integration = env.integration_name().to_string();
            let appended = match env.resources.first_container_mut(|c| c.name == integration) {
                Some(container) => {
                    container.ports.push(ContainerPort {
                        name: Some(container_port_name.clone()),
                        container_port,
                        protocol: Some("TCP".to_string()),
                    });
                    true
                }
                None => false,
            };

            if !appended {
                // An absent container here is a pipeline ordering fault, not
                // a transient condition.
                return Err(Error::configuration(format!(
                    "cannot add {container_port_name} container port: no integration container"
                )));
            }

            let message = format!(
                "{service_name}({port_name}/{port}) -> {integration}({container_port_name}/{container_port})"
            );
            env.set_condition(
                CONDITION_SERVICE_AVAILABLE,
                ConditionStatus::True,
                REASON_SERVICE_AVAILABLE,
                message,
            );
            Ok(())
        }));

        Ok(())
    }
}

fn service_for(name: &str, namespace: &str) -> Service {
    let mut selector = BTreeMap::new();
    selector.insert(INTEGRATION_LABEL.to_string(), name.to_string());

    Service {
        api_version: "v1".to_string(),
        kind: "Service".to_string(),
        metadata: ObjectMeta::new(name, namespace).with_label(INTEGRATION_LABEL, name),
        spec: ServiceSpec {
            selector,
            ports: Vec::new(),
        },
    }
}
