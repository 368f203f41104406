//! Caravan - operator core for turning Integration resources into running workloads
//!
//! Caravan reconciles two linked custom resources - an [`Integration`](crd::Integration)
//! describing user source code, and a [`Build`](crd::Build) tracking one attempt to
//! produce a runnable artifact from it - into staged cluster manifests and build
//! results.
//!
//! # Architecture
//!
//! Reconciliation happens in two independent subsystems:
//! - A *trait pipeline*: an ordered, closed set of handlers, each with a
//!   side-effect-free Configure phase and a mutating Apply phase, run over one
//!   shared [`Environment`](traits::Environment). Deferred cross-trait mutations
//!   are queued as post-processors and drained once after all Apply calls.
//! - A *build action* subsystem: handlers over the Build resource that reconcile
//!   externally observed pod state into the build's phase machine, one transition
//!   per reconcile pass.
//!
//! Builds themselves run behind the [`Builder`](build::Builder) dispatch contract:
//! one request in, exactly one asynchronously delivered result out.
//!
//! # Modules
//!
//! - [`crd`] - Custom Resource Definitions (Integration, Build)
//! - [`build`] - Build data model and the Builder dispatch contract
//! - [`resources`] - Staged manifest collection produced by a pipeline run
//! - [`metadata`] - Catalog lookups and source metadata extraction
//! - [`traits`] - The trait pipeline and its handlers
//! - [`controller`] - Build action handlers (pod monitoring)
//! - [`error`] - Error types for the operator core

#![deny(missing_docs)]

pub mod build;
pub mod controller;
pub mod crd;
pub mod error;
pub mod metadata;
pub mod resources;
pub mod traits;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Default Configuration Constants
// =============================================================================
// Centralized so trait defaults, staged manifests, and test fixtures agree.

/// Default port exposed by an integration's Service
pub const DEFAULT_SERVICE_PORT: u16 = 80;

/// Default port the integration container listens on
pub const DEFAULT_CONTAINER_PORT: u16 = 8080;

/// Default name shared by the service port and the container port
///
/// Service ports target container ports by this name, not by number, so the
/// two sides can be renumbered independently.
pub const HTTP_PORT_NAME: &str = "http";

/// Label carrying the owning integration's name on every staged resource
pub const INTEGRATION_LABEL: &str = "caravan.dev/integration";

/// Label marking a staged Service as user-facing
pub const SERVICE_TYPE_LABEL: &str = "caravan.dev/service.type";

/// Value of [`SERVICE_TYPE_LABEL`] for user-facing services
pub const SERVICE_TYPE_USER: &str = "user";
