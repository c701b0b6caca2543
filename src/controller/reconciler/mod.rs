//! # Reconciler
//!
//! Drives one deployment from its options to running workloads.
//!
//! The reconciler:
//! - Validates options and builds the effective configuration
//! - Skips work when the configuration hash is unchanged
//! - Applies rendered manifests, deferring the trigger on transient failures
//! - Derives the lifecycle status from workload readiness
//! - Deletes everything it applied on teardown

pub mod reconcile;
pub mod state;
pub mod status;
pub mod types;
pub mod validation;

pub use state::ControllerState;
pub use status::Status;
pub use types::{Reconciler, ReconcilerError, Trigger};
