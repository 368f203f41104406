//! Custom Resource Definitions for Caravan
//!
//! Two linked resources drive the operator core:
//! - [`Integration`] - the user-declared resource describing source code and
//!   desired runtime behavior
//! - [`Build`] - the resource tracking one attempt to produce a runnable
//!   artifact from integration source

mod build;
mod integration;
mod types;

pub use build::{Build, BuildPhase, BuildSpec, BuildStatus, BuildStrategy};
pub use integration::{Integration, IntegrationSpec, IntegrationStatus};
pub use types::{
    Condition, ConditionStatus, DeploymentTraitSpec, IntegrationPhase, Language, ServiceTraitSpec,
    SourceSpec, TraitsSpec, CONDITION_SERVICE_AVAILABLE, REASON_SERVICE_AVAILABLE,
    REASON_SERVICE_NOT_AVAILABLE,
};
