//! # Configuration
//!
//! Process-level configuration for the controller binary.
//!
//! Deployment options (the configuration surface reconciled into manifests) are
//! not loaded here; they arrive with each trigger and are validated by
//! [`crate::controller::reconciler::validation`].

mod controller;

pub use controller::ControllerConfig;
