//! # Controller
//!
//! Core controller modules.
//!
//! - `deployment`: The two managed deployments and what differs between them
//! - `manifests`: Templates, the transform chain, and the configuration hash
//! - `reconciler`: Trigger handling, validation, and status

pub mod deployment;
pub mod manifests;
pub mod reconciler;
