//! # NVIDIA Operator Controller
//!
//! Reconciles the NVIDIA GPU Operator and NVIDIA Network Operator deployments
//! on behalf of a cluster lifecycle manager.
//!
//! ## Overview
//!
//! On every trigger the controller:
//!
//! 1. **Validates options** - YAML-carrying options are parsed and checked against their schemas
//! 2. **Hashes the effective configuration** - an unchanged hash means nothing to apply
//! 3. **Renders manifests** - base templates are cloned and run through a fixed transform chain
//! 4. **Applies to the cluster** - server-side apply, deferring the trigger on transient failures
//! 5. **Reports status** - readiness of the deployed workloads becomes the lifecycle status
//!
//! The cluster API and the lifecycle manager are collaborators behind the
//! [`provider::ClusterClient`] and [`runtime::LifecycleScheduler`] traits.

pub mod config;
pub mod constants;
pub mod controller;
pub mod observability;
pub mod provider;
pub mod runtime;

pub use controller::deployment::Deployment;
pub use controller::reconciler::{ControllerState, Reconciler, ReconcilerError, Trigger};

/// Common imports for driving the controller
pub mod prelude {
    pub use crate::config::ControllerConfig;
    pub use crate::controller::deployment::Deployment;
    pub use crate::controller::manifests::{
        ConfigHash, Evaluation, ManifestError, ManifestResource, ManifestSet,
    };
    pub use crate::controller::reconciler::status::Status;
    pub use crate::controller::reconciler::validation::{ConfigValidator, RawConfig};
    pub use crate::controller::reconciler::{
        ControllerState, Reconciler, ReconcilerError, Trigger,
    };
    pub use crate::provider::{ClusterClient, ClusterError, ResourceStatus};
    pub use crate::runtime::{LifecycleScheduler, LocalScheduler};
}
