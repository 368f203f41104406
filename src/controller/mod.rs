//! Reconciliation handlers for Caravan resources
//!
//! This module contains the action handlers that reconcile Build resources
//! against externally observed process state. Actions follow the Kubernetes
//! controller pattern: a pure applicability predicate plus a handle step
//! producing at most one phase transition per reconcile pass.

pub mod build;
